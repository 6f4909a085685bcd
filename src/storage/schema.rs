//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the intermediate store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    listing_failures INTEGER NOT NULL DEFAULT 0,
    detail_failures INTEGER NOT NULL DEFAULT 0
);

-- Set members (discovered detail references)
CREATE TABLE IF NOT EXISTS sets (
    set_key TEXT NOT NULL,
    member TEXT NOT NULL,
    UNIQUE(set_key, member)
);

CREATE INDEX IF NOT EXISTS idx_sets_key ON sets(set_key);

-- Record fields (extracted companies keyed by detail reference)
CREATE TABLE IF NOT EXISTS records (
    record_key TEXT NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL,
    UNIQUE(record_key, field)
);

CREATE INDEX IF NOT EXISTS idx_records_key ON records(record_key);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
