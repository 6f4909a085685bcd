//! Company-Harvest: a job-board company crawler
//!
//! This crate crawls the paginated listing pages of a job board, follows every
//! job detail reference it finds, extracts the advertising company from each
//! detail page, and exports a deduplicated CSV report of companies with the
//! number of postings each one appeared under.
//!
//! Partial results live in a durable intermediate store so a crawl can be
//! resumed or run incrementally.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Company-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to write report {path}: {source}")]
    Export { path: String, source: csv::Error },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true for failures caused by the remote site or the transport
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Http { .. } | Self::Reqwest(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Company-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL construction
pub type UrlResult<T> = std::result::Result<T, ::url::ParseError>;

// Re-export commonly used types
pub use config::Config;
pub use output::AggregatedCompany;
pub use state::TaskState;
pub use storage::{CompanyRecord, SharedStore, SqliteStore, Store};
