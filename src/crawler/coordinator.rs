//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties the pieces together:
//! - Phase 1 fetches listing pages `0..=max_pages` and adds every detail
//!   reference to the discovery set
//! - Phase 2 snapshots the discovery set and extracts one company record per
//!   reference, writing each record through to the store
//! - The export step aggregates stored records into the CSV report
//!
//! Each phase starts only after the previous one's barrier released.

use crate::config::Config;
use crate::crawler::detail::DetailExtractor;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::listing::ListingExtractor;
use crate::crawler::scheduler::{Phase, PhaseReport, Scheduler};
use crate::output::{aggregate_store, write_report};
use crate::storage::{lock_store, write_record, RunStatus, SharedStore};
use crate::url::{listing_urls, resolve_reference};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Options for a single crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Clear discovered references and records before crawling
    pub fresh: bool,

    /// Skip references that already have a stored record
    pub incremental: bool,

    /// Hash of the configuration file, recorded with the run
    pub config_hash: String,
}

/// Everything a finished crawl reports back
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub run_id: i64,
    pub listing: PhaseReport,
    pub detail: PhaseReport,

    /// References skipped because a record already existed
    pub skipped: usize,

    /// Size of the discovery set when the detail phase started
    pub discovered: usize,

    /// Rows written to the report
    pub companies_exported: usize,
}

impl CrawlSummary {
    /// Total number of failed tasks across both phases
    pub fn failure_count(&self) -> usize {
        self.listing.failure_count() + self.detail.failure_count()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    store: SharedStore,
    scheduler: Scheduler,
    client: Client,
    base_url: Url,
    listing: Arc<ListingExtractor>,
    detail: Arc<DetailExtractor>,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - The intermediate store every task writes to
    pub fn new(config: Config, store: SharedStore) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent)?;
        let base_url = Url::parse(&config.crawler.base_url)?;
        let listing = ListingExtractor::new(&config.extract)?;
        let detail = DetailExtractor::new(&config.extract)?;
        let scheduler = Scheduler::from_config(&config.crawler);

        Ok(Self {
            config: Arc::new(config),
            store,
            scheduler,
            client,
            base_url,
            listing: Arc::new(listing),
            detail: Arc::new(detail),
        })
    }

    /// Returns the shared store handle
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Runs the full pipeline: discovery, extraction, export
    ///
    /// Task failures do not fail the run; they are listed in the returned
    /// summary. Store failures outside of tasks and export failures do.
    pub async fn run(&self, options: &CrawlOptions) -> Result<CrawlSummary, HarvestError> {
        let run_id = {
            let mut store = lock_store(&self.store)?;
            if options.fresh {
                tracing::info!("Clearing discovered references and records");
                store.clear()?;
            }
            store.create_run(&options.config_hash)?
        };
        tracing::info!("Started crawl run {}", run_id);

        let result = self.run_pipeline(run_id, options.incremental).await;

        let (status, listing_failures, detail_failures) = match &result {
            Ok(summary) => (
                RunStatus::Completed,
                summary.listing.failure_count() as u64,
                summary.detail.failure_count() as u64,
            ),
            Err(_) => (RunStatus::Failed, 0, 0),
        };
        lock_store(&self.store)?.finish_run(run_id, status, listing_failures, detail_failures)?;

        result
    }

    async fn run_pipeline(
        &self,
        run_id: i64,
        incremental: bool,
    ) -> Result<CrawlSummary, HarvestError> {
        let listing = self.discover().await?;
        let (detail, discovered, skipped) = self.extract_details(incremental).await?;

        let csv_path = self.config.output.csv_path.clone();
        let companies_exported = self.export(Path::new(&csv_path))?;

        Ok(CrawlSummary {
            run_id,
            listing,
            detail,
            skipped,
            discovered,
            companies_exported,
        })
    }

    /// Phase 1: fetches every listing page and fills the discovery set
    pub async fn discover(&self) -> Result<PhaseReport, HarvestError> {
        let urls = listing_urls(&self.config.crawler.base_url, self.config.crawler.max_pages)?;
        let targets = urls.into_iter().map(String::from).collect();

        let client = self.client.clone();
        let store = self.store.clone();
        let extractor = self.listing.clone();
        let set_key = Arc::new(self.config.crawler.discovery_set.clone());

        let report = self
            .scheduler
            .run_phase(Phase::Listing, targets, move |target| {
                let client = client.clone();
                let store = store.clone();
                let extractor = extractor.clone();
                let set_key = set_key.clone();
                async move { discover_page(&client, &store, &extractor, &set_key, &target).await }
            })
            .await;

        Ok(report)
    }

    /// Phase 2: extracts one record per discovered reference
    ///
    /// Works on a snapshot of the discovery set taken before the first task
    /// launches. Returns the phase report, the snapshot size and the number
    /// of references skipped in incremental mode.
    pub async fn extract_details(
        &self,
        incremental: bool,
    ) -> Result<(PhaseReport, usize, usize), HarvestError> {
        let (targets, discovered) = {
            let store = lock_store(&self.store)?;
            let snapshot = store.set_members(&self.config.crawler.discovery_set)?;
            let discovered = snapshot.len();

            let mut targets = Vec::with_capacity(snapshot.len());
            for reference in snapshot {
                if incremental && store.record_exists(&reference)? {
                    continue;
                }
                targets.push(reference);
            }
            (targets, discovered)
        };
        let skipped = discovered - targets.len();
        tracing::info!(
            "Discovery set holds {} references ({} already extracted, skipped)",
            discovered,
            skipped
        );

        let client = self.client.clone();
        let store = self.store.clone();
        let extractor = self.detail.clone();
        let base_url = Arc::new(self.base_url.clone());

        let report = self
            .scheduler
            .run_phase(Phase::Detail, targets, move |reference| {
                let client = client.clone();
                let store = store.clone();
                let extractor = extractor.clone();
                let base_url = base_url.clone();
                async move {
                    extract_detail(&client, &store, &extractor, &base_url, &reference).await
                }
            })
            .await;

        Ok((report, discovered, skipped))
    }

    /// Aggregates stored records and writes the CSV report
    ///
    /// Returns the number of distinct companies written.
    pub fn export(&self, path: &Path) -> Result<usize, HarvestError> {
        let companies = {
            let store = lock_store(&self.store)?;
            aggregate_store(&*store, &self.config.crawler.record_pattern)?
        };

        write_report(path, &companies)?;
        tracing::info!(
            "Exported {} companies to {}",
            companies.len(),
            path.display()
        );
        Ok(companies.len())
    }
}

/// Fetches one listing page and persists its detail references
async fn discover_page(
    client: &Client,
    store: &SharedStore,
    extractor: &ListingExtractor,
    set_key: &str,
    target: &str,
) -> Result<usize, HarvestError> {
    let url = Url::parse(target)?;
    let page = fetch_page(client, &url).await?;
    let references = extractor.extract_from_body(&page.body);

    let mut store = lock_store(store)?;
    let mut added = 0;
    for reference in &references {
        if store.set_add(set_key, reference)? {
            added += 1;
        }
    }

    tracing::debug!(
        "{}: {} references ({} new)",
        target,
        references.len(),
        added
    );
    Ok(references.len())
}

/// Fetches one detail page and writes its company record
async fn extract_detail(
    client: &Client,
    store: &SharedStore,
    extractor: &DetailExtractor,
    base_url: &Url,
    reference: &str,
) -> Result<usize, HarvestError> {
    let url = resolve_reference(base_url, reference)?;
    let page = fetch_page(client, &url).await?;
    let record = extractor.extract_from_body(&page.body, reference);

    write_record(&mut *lock_store(store)?, &record)?;

    tracing::debug!("{}: extracted '{}'", reference, record.name);
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::storage::{share, SqliteStore};

    fn create_test_config() -> Config {
        parse_config(
            r#"
[crawler]
base-url = "https://jobs.example.com/kantou/"
max-pages = 2
request-delay-ms = 0

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
database-path = ":memory:"
csv-path = "./companies.csv"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_coordinator_creation() {
        let store = share(SqliteStore::new_in_memory().unwrap());
        let coordinator = Coordinator::new(create_test_config(), store);
        assert!(coordinator.is_ok());
    }

    #[tokio::test]
    async fn test_incremental_skips_extracted_references() {
        let store = share(SqliteStore::new_in_memory().unwrap());
        {
            let mut guard = lock_store(&store).unwrap();
            guard.set_add("JOB_LIST", "/detail/1").unwrap();
            guard.record_put("/detail/1", "Name", "Acme Corp").unwrap();
        }
        let coordinator = Coordinator::new(create_test_config(), store).unwrap();

        let (report, discovered, skipped) = coordinator.extract_details(true).await.unwrap();

        assert_eq!(discovered, 1);
        assert_eq!(skipped, 1);
        assert_eq!(report.launched(), 0);
    }

    #[test]
    fn test_export_from_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let store = share(SqliteStore::new_in_memory().unwrap());
        {
            let mut guard = lock_store(&store).unwrap();
            guard.record_put("/detail/1", "Name", "Acme Corp").unwrap();
            guard.record_put("/detail/2", "Name", "Acme Corp").unwrap();
            guard.record_put("/detail/3", "Name", "Globex").unwrap();
        }
        let coordinator = Coordinator::new(create_test_config(), store).unwrap();

        let exported = coordinator.export(&path).unwrap();

        assert_eq!(exported, 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Acme Corp,,,,2\nGlobex,,,,1\n");
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let store = share(SqliteStore::new_in_memory().unwrap());
        let coordinator = Coordinator::new(create_test_config(), store).unwrap();

        let result = coordinator.export(Path::new("/nonexistent/dir/report.csv"));

        assert!(matches!(result, Err(HarvestError::Export { .. })));
    }
}
