//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with a descriptive user agent
//! - GET requests for listing and detail pages
//! - Folding transport and HTTP-level failures into one error per request
//!
//! There are no retries. A failed fetch is reported to the task that made it
//! and the scheduler records it as a failed task.

use crate::config::UserAgentConfig;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use company_harvest::config::UserAgentConfig;
/// use company_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "CompanyHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body
///
/// Non-success status codes count as failures, as does a body that cannot
/// be read.
///
/// # Returns
///
/// * `Ok(FetchedPage)` - The page body
/// * `Err(HarvestError::Http)` - The server answered with a non-2xx status
/// * `Err(HarvestError::Network)` - The request or body transfer failed
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, HarvestError> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| network_error(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(HarvestError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| network_error(url, e))?;

    Ok(FetchedPage {
        url: final_url,
        status_code: status.as_u16(),
        body,
    })
}

/// Classifies a transport error for logging
fn network_error(url: &Url, error: reqwest::Error) -> HarvestError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    HarvestError::Network {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let client = build_http_client(&create_test_config()).unwrap();
        let url = Url::parse(&format!("{}/list", server.uri())).unwrap();
        let page = fetch_page(&client, &url).await.unwrap();

        assert_eq!(page.status_code, 200);
        assert_eq!(page.body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_http_client(&create_test_config()).unwrap();
        let url = Url::parse(&format!("{}/detail/1", server.uri())).unwrap();
        let result = fetch_page(&client, &url).await;

        match result {
            Err(HarvestError::Http { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = build_http_client(&create_test_config()).unwrap();
        // Port 9 (discard) is closed on test machines
        let url = Url::parse("http://127.0.0.1:9/list").unwrap();
        let result = fetch_page(&client, &url).await;

        let err = result.unwrap_err();
        assert!(err.is_network());
    }
}
