//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.
//! Sets and records live in two narrow tables; SQLite's `GLOB` operator gives
//! the same wildcard syntax as a Redis key scan.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a store at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store, used by tests and dry runs
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        listing_failures: row.get::<_, i64>(5)? as u64,
        detail_failures: row.get::<_, i64>(6)? as u64,
    })
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, listing_failures, detail_failures";

impl Store for SqliteStore {
    // ===== Sets =====

    fn set_add(&mut self, set_key: &str, member: &str) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO sets (set_key, member) VALUES (?1, ?2)",
            params![set_key, member],
        )?;
        Ok(inserted > 0)
    }

    fn set_members(&self, set_key: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT member FROM sets WHERE set_key = ?1 ORDER BY rowid")?;

        let members = stmt
            .query_map(params![set_key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(members)
    }

    fn set_len(&self, set_key: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sets WHERE set_key = ?1",
            params![set_key],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Records =====

    fn record_put(&mut self, key: &str, field: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO records (record_key, field, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(record_key, field) DO UPDATE SET value = excluded.value",
            params![key, field, value],
        )?;
        Ok(())
    }

    fn record_get_all(&self, key: &str) -> StorageResult<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT field, value FROM records WHERE record_key = ?1")?;

        let fields = stmt
            .query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<HashMap<String, String>, _>>()?;

        Ok(fields)
    }

    fn record_exists(&self, key: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM records WHERE record_key = ?1 LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn scan_keys_matching(&self, pattern: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_key FROM records WHERE record_key GLOB ?1
             GROUP BY record_key ORDER BY MIN(rowid)",
        )?;

        let keys = stmt
            .query_map(params![pattern], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn
            .execute_batch("DELETE FROM sets; DELETE FROM records;")?;
        Ok(())
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        listing_failures: u64,
        detail_failures: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, listing_failures = ?3,
             detail_failures = ?4 WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                listing_failures as i64,
                detail_failures as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}
