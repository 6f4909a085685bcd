//! Statistics from the intermediate store and crawl summaries
//!
//! This module provides functionality for extracting and displaying
//! store statistics and the outcome of a finished crawl.

use crate::crawler::{CrawlSummary, PhaseReport};
use crate::storage::{RunRecord, StorageResult, Store};

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Number of references in the discovery set
    pub discovered: u64,

    /// Number of stored company records
    pub extracted: u64,

    /// Discovered references without a stored record
    pub pending: u64,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The store to query
/// * `discovery_set` - Key of the discovery set
/// * `record_pattern` - Pattern matching company record keys
pub fn load_statistics(
    store: &dyn Store,
    discovery_set: &str,
    record_pattern: &str,
) -> StorageResult<StoreStatistics> {
    let discovered = store.set_len(discovery_set)?;
    let extracted = store.scan_keys_matching(record_pattern)?.len() as u64;

    let mut pending = 0;
    for reference in store.set_members(discovery_set)? {
        if !store.record_exists(&reference)? {
            pending += 1;
        }
    }

    let latest_run = store.latest_run()?;

    Ok(StoreStatistics {
        discovered,
        extracted,
        pending,
        latest_run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Detail references discovered: {}", stats.discovered);
    println!("  Company records extracted: {}", stats.extracted);
    println!("  References pending extraction: {}", stats.pending);
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  Run ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Listing failures: {}", run.listing_failures);
            println!("  Detail failures: {}", run.detail_failures);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No crawl runs recorded."),
    }
}

/// Prints the outcome of a finished crawl
pub fn print_crawl_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary (run {}) ===\n", summary.run_id);

    print_phase(&summary.listing);
    println!(
        "  References discovered: {} ({} skipped as already extracted)",
        summary.discovered, summary.skipped
    );
    println!();

    print_phase(&summary.detail);
    println!();

    println!("Companies exported: {}", summary.companies_exported);

    if summary.failure_count() > 0 {
        println!("\nFailed targets ({}):", summary.failure_count());
        for outcome in summary.listing.failures().chain(summary.detail.failures()) {
            println!(
                "  - {}: {}",
                outcome.target,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn print_phase(report: &PhaseReport) {
    println!("Phase {}:", report.phase);
    println!("  Launched: {}", report.launched());
    println!("  Succeeded: {}", report.succeeded());
    println!("  Failed: {}", report.failure_count());
}
