//! Integration tests for the crawler
//!
//! These tests use wiremock to create a mock job board and run the full
//! listing, detail and export cycle end-to-end.

use company_harvest::config::{Config, CrawlerConfig, ExtractConfig, OutputConfig, UserAgentConfig};
use company_harvest::crawler::{crawl, Coordinator, CrawlOptions};
use company_harvest::storage::{lock_store, open_store, RunStatus, SqliteStore, Store};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, max_pages: u32, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            max_pages,
            request_delay_ms: 0,
            // One task at a time keeps store insertion order deterministic
            max_concurrent_requests: 1,
            discovery_set: "JOB_LIST".to_string(),
            record_pattern: "*detail*".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            database_path: dir.path().join("harvest.db").display().to_string(),
            csv_path: dir.path().join("companies.csv").display().to_string(),
        },
        extract: ExtractConfig::default(),
    }
}

fn listing_page(references: &[&str]) -> String {
    let anchors: String = references
        .iter()
        .map(|r| format!(r#"<div class="job-cassette"><a href="{}">求人</a></div>"#, r))
        .collect();
    format!(
        r#"<html><body><div class="job-cassette-lst-wrap">{}</div><a href="/detail/outside">x</a></body></html>"#,
        anchors
    )
}

fn detail_page(name: &str, address: &str, phone: &str) -> String {
    format!(
        r#"<html><body>
        <dl class="job-ditail-tbl-inner"><dt>社名（店舗名）</dt><dd><p>{}</p></dd></dl>
        <dl class="job-ditail-tbl-inner"><dt>会社事業内容</dt><dd><p>人材サービス</p></dd></dl>
        <dl class="job-ditail-tbl-inner"><dt>会社住所</dt><dd><p>{}</p></dd></dl>
        <dl class="job-ditail-tbl-inner"><dt>問い合わせ番号</dt><dd><p><span class="detail-tel-ico">{}</span></p></dd></dl>
        </body></html>"#,
        name, address, phone
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// Mounts listing pages 0 and 1 of the mock job board
async fn mount_listings(server: &MockServer) {
    // Page-specific mocks are mounted first so they take precedence
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .and(query_param("page", "1"))
        .respond_with(html(listing_page(&["/detail/2", "/detail/3", "/list/ad"])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(html(listing_page(&["/detail/1", "/detail/2"])))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, reference: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(reference))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn count_requests(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

#[tokio::test]
async fn test_full_crawl_exports_deduplicated_companies() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_listings(&server).await;
    mount_detail(&server, "/detail/1", detail_page("Acme Corp", "東京都港区1-1", "03-1111-2222"), 1).await;
    mount_detail(&server, "/detail/2", detail_page("Acme Corp", "大阪府大阪市2-2", "06-3333-4444"), 1).await;
    mount_detail(&server, "/detail/3", detail_page("Globex", "愛知県名古屋市3-3", "052-555-6666"), 1).await;

    let config = create_test_config(&format!("{}/jobs/", server.uri()), 1, &dir);
    let csv_path = config.output.csv_path.clone();

    let summary = crawl(config, &CrawlOptions::default()).await.unwrap();

    assert_eq!(summary.listing.launched(), 2);
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.detail.succeeded(), 3);
    assert_eq!(summary.failure_count(), 0);
    assert_eq!(summary.companies_exported, 2);

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        contents,
        "Acme Corp,人材サービス,東京都港区1-1,03-1111-2222,2\n\
         Globex,人材サービス,愛知県名古屋市3-3,052-555-6666,1\n"
    );
}

#[tokio::test]
async fn test_listing_pages_zero_through_max_are_fetched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(html(listing_page(&[])))
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/jobs/", server.uri()), 2, &dir);
    let summary = crawl(config, &CrawlOptions::default()).await.unwrap();

    assert_eq!(summary.listing.launched(), 3);
    assert_eq!(count_requests(&server, "/jobs/").await, 3);

    let queries: Vec<Option<String>> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.query().map(String::from))
        .collect();
    assert!(queries.contains(&None));
    assert!(queries.contains(&Some("page=1".to_string())));
    assert!(queries.contains(&Some("page=2".to_string())));

    // No references means an empty report, not an error
    assert_eq!(summary.companies_exported, 0);
}

#[tokio::test]
async fn test_failed_detail_page_yields_partial_report() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_listings(&server).await;
    mount_detail(&server, "/detail/1", detail_page("Acme Corp", "東京", "03"), 1).await;
    mount_detail(&server, "/detail/2", detail_page("Acme Corp", "大阪", "06"), 1).await;
    Mock::given(method("GET"))
        .and(path("/detail/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/jobs/", server.uri()), 1, &dir);
    let db_path = config.output.database_path.clone();
    let csv_path = config.output.csv_path.clone();

    let summary = crawl(config, &CrawlOptions::default()).await.unwrap();

    assert_eq!(summary.detail.failure_count(), 1);
    let failed: Vec<_> = summary.detail.failures().collect();
    assert_eq!(failed[0].target, "/detail/3");

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents, "Acme Corp,人材サービス,東京,03,2\n");

    let store = SqliteStore::new(Path::new(&db_path)).unwrap();
    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.detail_failures, 1);
    assert_eq!(run.listing_failures, 0);
    assert!(!store.record_exists("/detail/3").unwrap());
}

#[tokio::test]
async fn test_failed_listing_page_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(html(listing_page(&["/detail/1"])))
        .mount(&server)
        .await;
    mount_detail(&server, "/detail/1", detail_page("Acme Corp", "東京", "03"), 1).await;

    let config = create_test_config(&format!("{}/jobs/", server.uri()), 1, &dir);
    let summary = crawl(config, &CrawlOptions::default()).await.unwrap();

    assert_eq!(summary.listing.failure_count(), 1);
    assert_eq!(summary.detail.succeeded(), 1);
    assert_eq!(summary.companies_exported, 1);
}

#[tokio::test]
async fn test_incremental_run_skips_extracted_references() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_listings(&server).await;
    // Each detail page must be fetched exactly once across both runs
    mount_detail(&server, "/detail/1", detail_page("Acme Corp", "東京", "03"), 1).await;
    mount_detail(&server, "/detail/2", detail_page("Acme Corp", "大阪", "06"), 1).await;
    mount_detail(&server, "/detail/3", detail_page("Globex", "名古屋", "052"), 1).await;

    let config = create_test_config(&format!("{}/jobs/", server.uri()), 1, &dir);
    let store = open_store(Path::new(&config.output.database_path)).unwrap();
    let coordinator = Coordinator::new(config, store).unwrap();

    let first = coordinator.run(&CrawlOptions::default()).await.unwrap();
    assert_eq!(first.detail.succeeded(), 3);

    let options = CrawlOptions {
        incremental: true,
        ..CrawlOptions::default()
    };
    let second = coordinator.run(&options).await.unwrap();

    assert_eq!(second.discovered, 3);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.detail.launched(), 0);
    assert_eq!(second.companies_exported, 2);
    assert_eq!(count_requests(&server, "/jobs/").await, 4);
}

#[tokio::test]
async fn test_fresh_run_clears_previous_results() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(html(listing_page(&["/detail/1"])))
        .mount(&server)
        .await;
    mount_detail(&server, "/detail/1", detail_page("Acme Corp", "東京", "03"), 1).await;

    let config = create_test_config(&format!("{}/jobs/", server.uri()), 0, &dir);
    let csv_path = config.output.csv_path.clone();
    let store = open_store(Path::new(&config.output.database_path)).unwrap();
    {
        let mut guard = lock_store(&store).unwrap();
        guard.set_add("JOB_LIST", "/detail/stale").unwrap();
        guard.record_put("/detail/stale", "Name", "Stale Inc").unwrap();
    }
    let coordinator = Coordinator::new(config, store).unwrap();

    let options = CrawlOptions {
        fresh: true,
        ..CrawlOptions::default()
    };
    let summary = coordinator.run(&options).await.unwrap();

    assert_eq!(summary.discovered, 1);
    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents, "Acme Corp,人材サービス,東京,03,1\n");
}
