//! Listing page extraction
//!
//! A listing page enumerates job postings. Each posting links to its detail
//! page; those links are the detail references the second crawl phase
//! follows.

use crate::config::{parse_selector, ExtractConfig};
use crate::ConfigResult;
use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// Extracts detail references from listing pages
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    anchors: Selector,
    marker: String,
}

impl ListingExtractor {
    /// Builds an extractor from the configured selector rules
    pub fn new(config: &ExtractConfig) -> ConfigResult<Self> {
        Ok(Self {
            anchors: parse_selector(&config.listing_selector)?,
            marker: config.reference_marker.clone(),
        })
    }

    /// Returns the detail references on a listing page
    ///
    /// Every anchor under the listing container is inspected; its `href` is
    /// kept when it contains the reference marker. Duplicates collapse.
    pub fn extract_references(&self, document: &Html) -> BTreeSet<String> {
        document
            .select(&self.anchors)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter(|href| href.contains(self.marker.as_str()))
            .map(str::to_string)
            .collect()
    }

    /// Parses a page body and extracts its references
    pub fn extract_from_body(&self, body: &str) -> BTreeSet<String> {
        self.extract_references(&Html::parse_document(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn test_keeps_only_detail_links() {
        let html = r#"
            <html><body>
            <div class="job-cassette-lst-wrap">
                <a href="/detail/123">Job 123</a>
                <a href="/other/456">Other</a>
            </div>
            </body></html>
        "#;

        let refs = extractor().extract_from_body(html);

        assert_eq!(refs.len(), 1);
        assert!(refs.contains("/detail/123"));
    }

    #[test]
    fn test_ignores_links_outside_container() {
        let html = r#"
            <html><body>
            <a href="/detail/999">Sidebar</a>
            <div class="job-cassette-lst-wrap"><a href="/detail/1">Job</a></div>
            </body></html>
        "#;

        let refs = extractor().extract_from_body(html);

        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["/detail/1"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let html = r#"
            <div class="job-cassette-lst-wrap">
                <a href="/detail/7">Title</a>
                <a href="/detail/7">Read more</a>
                <a>No href</a>
            </div>
        "#;

        let refs = extractor().extract_from_body(html);

        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_marker_matches_anywhere_in_href() {
        let html = r#"
            <div class="job-cassette-lst-wrap">
                <a href="https://jobs.example.com/kantou/detail/clc_1/">Absolute</a>
                <a href="/job_details/2">Plural</a>
            </div>
        "#;

        let refs = extractor().extract_from_body(html);

        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        let refs = extractor().extract_from_body("<html><body></body></html>");
        assert!(refs.is_empty());
    }
}
