//! SQL schema for the local key-value store.
//!
//! Executed once at connection startup. `PRAGMA user_version` gates future
//! migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per key. Commentary rows are keyed `book|chapter|verse`;
-- the reading session lives under `readingState`.
CREATE TABLE IF NOT EXISTS entries (
    key         TEXT PRIMARY KEY,
    value_json  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

PRAGMA user_version = 1;
";
