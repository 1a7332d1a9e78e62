//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Contact-Sweep database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Organizations targeted for contact discovery
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- One row per (organization, website) pair
CREATE TABLE IF NOT EXISTS websites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    url TEXT NOT NULL,
    scrape_status TEXT NOT NULL DEFAULT 'pending',
    last_attempt_at TEXT,
    UNIQUE(organization_id, url)
);

CREATE INDEX IF NOT EXISTS idx_websites_status ON websites(scrape_status);

-- Discovered addresses, append-only
CREATE TABLE IF NOT EXISTS emails (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    address TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(organization_id, address)
);

CREATE INDEX IF NOT EXISTS idx_emails_organization ON emails(organization_id);

-- Track sweep runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    targets_seen INTEGER NOT NULL DEFAULT 0,
    targets_skipped INTEGER NOT NULL DEFAULT 0,
    with_email INTEGER NOT NULL DEFAULT 0,
    without_email INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    emails_inserted INTEGER NOT NULL DEFAULT 0
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
