//! Crawler module for fetching and extracting job pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - Listing and detail page extraction
//! - Phase scheduling with rate limiting and a concurrency bound
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod scheduler;

pub use coordinator::{Coordinator, CrawlOptions, CrawlSummary};
pub use detail::{CompanyField, DetailExtractor, LabelTable};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use listing::ListingExtractor;
pub use scheduler::{Phase, PhaseReport, Scheduler, TaskOutcome};

use crate::config::Config;
use crate::storage::open_store;
use crate::HarvestError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the intermediate store
/// 2. Record a new crawl run
/// 3. Fetch every listing page and collect detail references
/// 4. Fetch every detail page and store its company record
/// 5. Aggregate the records and write the CSV report
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `options` - Run mode flags and the configuration hash
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished; individual task failures are listed
/// * `Err(HarvestError)` - The store or the report could not be used
pub async fn crawl(config: Config, options: &CrawlOptions) -> Result<CrawlSummary, HarvestError> {
    let store = open_store(Path::new(&config.output.database_path))?;
    let coordinator = Coordinator::new(config, store)?;
    coordinator.run(options).await
}
