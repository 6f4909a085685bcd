//! Storage traits and error types
//!
//! This module defines the key/set interface the crawler persists through and
//! the associated error types. The operations mirror a small subset of a
//! Redis-like store: sets of members, hashes of field/value pairs, and a
//! glob-based key scan.

use crate::storage::{RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for intermediate store implementations
///
/// Every operation is atomic on its own. The crawler never needs multi-key
/// transactions because each task writes only the keys it owns.
pub trait Store {
    // ===== Sets =====

    /// Adds a member to a set
    ///
    /// Returns `true` if the member was not present before. Adding an
    /// existing member is a no-op.
    fn set_add(&mut self, set_key: &str, member: &str) -> StorageResult<bool>;

    /// Returns every member of a set in first-insertion order
    fn set_members(&self, set_key: &str) -> StorageResult<Vec<String>>;

    /// Returns the number of members in a set
    fn set_len(&self, set_key: &str) -> StorageResult<u64>;

    // ===== Records =====

    /// Sets one field of a record, replacing any previous value
    fn record_put(&mut self, key: &str, field: &str, value: &str) -> StorageResult<()>;

    /// Returns every field of a record (empty if the record does not exist)
    fn record_get_all(&self, key: &str) -> StorageResult<HashMap<String, String>>;

    /// Returns true if at least one field is stored under `key`
    fn record_exists(&self, key: &str) -> StorageResult<bool>;

    /// Returns every record key matching a glob pattern
    ///
    /// `*` matches any run of characters, `?` a single character and `[...]`
    /// a character class. Keys come back in first-insertion order.
    fn scan_keys_matching(&self, pattern: &str) -> StorageResult<Vec<String>>;

    /// Removes all sets and records (run history is kept)
    fn clear(&mut self) -> StorageResult<()>;

    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run finished with its final status and failure counts
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        listing_failures: u64,
        detail_failures: u64,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
