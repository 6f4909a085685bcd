//! Company-Harvest main entry point
//!
//! This is the command-line interface for the Company-Harvest crawler.

use anyhow::Context;
use clap::Parser;
use company_harvest::config::{load_config_with_hash, Config};
use company_harvest::crawler::{crawl, Coordinator, CrawlOptions};
use company_harvest::output::{
    load_statistics, merge_reports, print_crawl_summary, print_statistics,
};
use company_harvest::storage::{lock_store, open_store};
use company_harvest::url::listing_urls;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Company-Harvest: a job-board company crawler
///
/// Company-Harvest walks the listing pages of a job board, extracts the
/// advertising company from every job detail page, and writes a CSV report
/// of companies with the number of postings each one appeared under.
#[derive(Parser, Debug)]
#[command(name = "company-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A job-board company crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Clear discovered references and records before crawling
    #[arg(long, conflicts_with = "incremental")]
    fresh: bool,

    /// Only extract references that have no stored record yet
    #[arg(long, conflicts_with = "fresh")]
    incremental: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_only", "merge"])]
    dry_run: bool,

    /// Show statistics from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_only", "merge"])]
    stats: bool,

    /// Write the CSV report from the existing store without crawling
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "merge"])]
    export_only: bool,

    /// Merge previously exported CSV reports into one and exit
    #[arg(long, value_name = "CSV", num_args = 1..)]
    merge: Vec<PathBuf>,

    /// Report path, overriding the configured csv-path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.export_only {
        handle_export_only(config)
    } else if !cli.merge.is_empty() {
        handle_merge(&cli.merge, Path::new(&config.output.csv_path))
    } else {
        let options = CrawlOptions {
            fresh: cli.fresh,
            incremental: cli.incremental,
            config_hash,
        };
        handle_crawl(config, &options).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("company_harvest=info,warn"),
            1 => EnvFilter::new("company_harvest=debug,info"),
            2 => EnvFilter::new("company_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Company-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Discovery set: {}", config.crawler.discovery_set);
    println!("  Record pattern: {}", config.crawler.record_pattern);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);

    println!("\nOutput:");
    println!("  Store: {}", config.output.database_path);
    println!("  Report: {}", config.output.csv_path);

    let urls = listing_urls(&config.crawler.base_url, config.crawler.max_pages)
        .context("Failed to build listing URLs")?;
    println!("\nListing Pages ({}):", urls.len());
    for url in &urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Store: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open store")?;
    let store = lock_store(&store)?;

    let stats = load_statistics(
        &*store,
        &config.crawler.discovery_set,
        &config.crawler.record_pattern,
    )?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-only mode: writes the report from stored records
fn handle_export_only(config: Config) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open store")?;
    let csv_path = PathBuf::from(&config.output.csv_path);

    let coordinator = Coordinator::new(config, store)?;
    let exported = coordinator.export(&csv_path)?;

    println!("✓ {} companies exported to: {}", exported, csv_path.display());
    Ok(())
}

/// Handles the --merge mode: combines exported reports
fn handle_merge(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let rows = merge_reports(inputs, output).context("Failed to merge reports")?;

    println!("✓ {} companies merged into: {}", rows, output.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, options: &CrawlOptions) -> anyhow::Result<()> {
    if options.fresh {
        tracing::info!("Starting fresh crawl (clearing previous results)");
    } else if options.incremental {
        tracing::info!("Starting incremental crawl (skipping extracted references)");
    } else {
        tracing::info!("Starting crawl");
    }
    tracing::info!(
        "Base URL: {}, listing pages: 0..={}",
        config.crawler.base_url,
        config.crawler.max_pages
    );

    let summary = crawl(config, options).await.context("Crawl failed")?;
    print_crawl_summary(&summary);

    if summary.failure_count() > 0 {
        tracing::warn!(
            "Crawl finished with {} failed tasks; the report is partial",
            summary.failure_count()
        );
    } else {
        tracing::info!("Crawl completed successfully");
    }
    Ok(())
}
