//! URL handling for Company-Harvest
//!
//! Listing pages are addressed by a base URL plus an optional `page` query
//! parameter. Detail references are usually site-relative paths and are
//! resolved against the base URL before fetching.

use crate::UrlResult;
use url::Url;

/// Builds the URL of a listing page
///
/// Page 0 is the base URL itself; every other page appends `page=<n>` to the
/// query string, keeping any parameters the base already carries.
///
/// # Examples
///
/// ```
/// use company_harvest::url::build_listing_url;
///
/// let base = "https://jobs.example.com/kantou/";
/// assert_eq!(build_listing_url(base, 0).unwrap().as_str(), base);
/// assert_eq!(
///     build_listing_url(base, 3).unwrap().as_str(),
///     "https://jobs.example.com/kantou/?page=3"
/// );
/// ```
pub fn build_listing_url(base: &str, page: u32) -> UrlResult<Url> {
    let mut url = Url::parse(base)?;
    if page > 0 {
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
    }
    Ok(url)
}

/// Builds the URLs of listing pages `0..=max_pages`
pub fn listing_urls(base: &str, max_pages: u32) -> UrlResult<Vec<Url>> {
    (0..=max_pages)
        .map(|page| build_listing_url(base, page))
        .collect()
}

/// Resolves a detail reference against the site base URL
///
/// Absolute references are returned unchanged; paths are joined onto the
/// base's origin the way a browser would follow the link.
pub fn resolve_reference(base: &Url, reference: &str) -> UrlResult<Url> {
    base.join(reference.trim())
}
