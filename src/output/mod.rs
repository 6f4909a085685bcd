//! Output module for reports and statistics
//!
//! This module handles:
//! - Aggregating stored company records by name
//! - Writing the CSV report
//! - Merging previously exported reports
//! - Printing store statistics and crawl summaries

mod aggregate;
mod csv_report;
mod merge;
pub mod stats;

pub use aggregate::{aggregate_records, aggregate_store, AggregatedCompany};
pub use csv_report::{read_rows, write_report, write_rows, ReportRow};
pub use merge::{merge_reports, merge_rows};
pub use stats::{load_statistics, print_crawl_summary, print_statistics, StoreStatistics};
