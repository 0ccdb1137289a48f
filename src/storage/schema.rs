//! Database schema definitions for the SQLite backend.

/// SQL schema for creating all database tables.
///
/// Each collection is stored as a single JSON array so the relational
/// backend honours exactly the same contract as the JSON file.
pub const SCHEMA: &str = r#"
-- Collections table
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    items_json TEXT NOT NULL,
    item_count INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);
"#;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
