//! v001 -- Initial schema creation.
//!
//! Creates the `bills` table. A bill's nested collections are embedded in
//! the row as JSON rather than normalized into child tables.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Bills
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS bills (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    name       TEXT NOT NULL,
    document   TEXT NOT NULL,                 -- JSON: users, tags, lineItems, proportionalCharges
    images     TEXT NOT NULL DEFAULT '[]',    -- JSON array of {id, mimeType, base64Data}
    created_at TEXT NOT NULL                  -- ISO-8601 / RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_bills_created_at ON bills(created_at);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
