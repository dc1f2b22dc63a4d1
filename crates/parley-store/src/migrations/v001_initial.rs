//! v001 -- Initial schema creation.
//!
//! A single `kv_records` table holds every JSON record, keyed by name.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv_records (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,               -- serialized JSON (or raw text)
    updated_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
