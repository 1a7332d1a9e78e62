//! Storage module for persisting sweep data
//!
//! This module handles all database operations for the sweep, including:
//! - SQLite database initialization and schema management
//! - Pending target listing and website status writes
//! - Email inserts with per-organization uniqueness
//! - Run tracking and totals

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{init_database, SqliteStore};
pub use traits::{StorageError, StorageResult, TargetStore};

use crate::state::TargetStatus;
use crate::SweepError;

use std::path::Path;

/// Initializes or opens a target store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(SweepError)` - Failed to open the database
pub fn open_store(path: &Path) -> Result<SqliteStore, SweepError> {
    SqliteStore::new(path)
}

/// A target awaiting a crawl, as handed to the batch scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTarget {
    /// Organization ID; emails are keyed by it
    pub id: i64,
    /// Site URL exactly as stored
    pub site_url: String,
}

impl PendingTarget {
    pub fn new(id: i64, site_url: impl Into<String>) -> Self {
        Self {
            id,
            site_url: site_url.into(),
        }
    }
}

/// Represents a target's website row in the database
#[derive(Debug, Clone)]
pub struct TargetRecord {
    pub id: i64,
    pub name: String,
    pub site_url: String,
    pub status: TargetStatus,
    pub last_attempt_at: Option<String>,
}

/// Represents a stored email
#[derive(Debug, Clone)]
pub struct EmailRecord {
    pub id: i64,
    pub target_id: i64,
    pub address: String,
    pub created_at: String,
}

/// Outcome of one grouped email insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Rows actually written
    pub inserted: usize,
    /// Addresses already stored for the target
    pub conflicts: usize,
}

/// Totals recorded on a run when it completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub targets_seen: u64,
    pub targets_skipped: u64,
    pub with_email: u64,
    pub without_email: u64,
    pub failed: u64,
    pub emails_inserted: u64,
}

/// Represents a sweep run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Status of a sweep run
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
