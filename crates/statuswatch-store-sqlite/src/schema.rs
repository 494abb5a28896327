//! SQL schema for the statuswatch SQLite store.
//!
//! Not run at connection startup: the table appears on the first write,
//! the way a blob container appears when the first object lands. Reads
//! against a database without the table report an absent snapshot.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS snapshots (
    cache_key   TEXT PRIMARY KEY,
    body        TEXT NOT NULL,   -- the snapshot as one JSON document
    written_at  TEXT NOT NULL    -- ISO 8601 UTC; diagnostic only
);

PRAGMA user_version = 1;
";
