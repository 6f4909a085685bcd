//! Storage module for the intermediate store
//!
//! This module handles everything persisted between crawl phases:
//! - the discovery set of detail references
//! - one company record per detail reference (written through as soon as
//!   it is extracted)
//! - run tracking for resumed and incremental crawls
//!
//! The store is opened once at startup and shared between tasks as a
//! [`SharedStore`].

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, Store};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Field names used for company records in the store
pub const FIELD_NAME: &str = "Name";
pub const FIELD_ADDRESS: &str = "Address";
pub const FIELD_PHONE: &str = "Phone";
pub const FIELD_BUSINESS: &str = "Business";

/// Store handle shared by every crawl task
pub type SharedStore = Arc<Mutex<dyn Store + Send>>;

/// Opens the store at `path` and wraps it for sharing
pub fn open_store(path: &Path) -> StorageResult<SharedStore> {
    Ok(share(SqliteStore::new(path)?))
}

/// Wraps a store for sharing between tasks
pub fn share<S: Store + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared store
pub fn lock_store(store: &SharedStore) -> StorageResult<MutexGuard<'_, dyn Store + Send + 'static>> {
    store.lock().map_err(|_| StorageError::Poisoned)
}

/// A company extracted from one detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyRecord {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub business: String,

    /// Detail reference the record was extracted from; also its store key
    pub source_url: String,

    /// Number of postings this company appeared under (1 for a single page)
    pub occurrence_count: u32,
}

impl CompanyRecord {
    /// Creates an empty record for a detail reference
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            occurrence_count: 1,
            ..Self::default()
        }
    }

    /// Builds a record from stored fields; absent fields read as empty text
    pub fn from_fields(source_url: &str, mut fields: HashMap<String, String>) -> Self {
        let mut take = |field: &str| fields.remove(field).unwrap_or_default();
        Self {
            name: take(FIELD_NAME),
            address: take(FIELD_ADDRESS),
            phone: take(FIELD_PHONE),
            business: take(FIELD_BUSINESS),
            source_url: source_url.to_string(),
            occurrence_count: 1,
        }
    }

    /// The persisted (field, value) pairs of this record
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            (FIELD_NAME, self.name.as_str()),
            (FIELD_ADDRESS, self.address.as_str()),
            (FIELD_PHONE, self.phone.as_str()),
            (FIELD_BUSINESS, self.business.as_str()),
        ]
    }
}

/// Writes every field of a record under its source reference
pub fn write_record(store: &mut dyn Store, record: &CompanyRecord) -> StorageResult<()> {
    for (field, value) in record.fields() {
        store.record_put(&record.source_url, field, value)?;
    }
    Ok(())
}

/// Reads the record stored under `key`
pub fn read_record(store: &dyn Store, key: &str) -> StorageResult<CompanyRecord> {
    let fields = store.record_get_all(key)?;
    Ok(CompanyRecord::from_fields(key, fields))
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub listing_failures: u64,
    pub detail_failures: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
