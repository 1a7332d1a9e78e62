//! Storage traits and error types
//!
//! This module defines the trait interface for the target store and
//! associated error types.

use crate::state::TargetStatus;
use crate::storage::{
    EmailRecord, InsertReport, PendingTarget, RunRecord, RunTotals, TargetRecord,
};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Target not found: {target_id} ({site_url})")]
    TargetNotFound { target_id: i64, site_url: String },

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: TargetStatus,
        to: TargetStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the target store collaborator
///
/// The batch scheduler only needs the first three operations; the rest
/// serve intake, reporting and run tracking.
pub trait TargetStore {
    // ===== Scheduler Operations =====

    /// Lists targets whose website status is pending, in intake order
    fn list_pending_targets(&self) -> StorageResult<Vec<PendingTarget>>;

    /// Inserts the addresses found for a target as one group
    ///
    /// Addresses already stored for this target are counted as conflicts
    /// and skipped; they never fail the insert.
    fn insert_emails(
        &mut self,
        target_id: i64,
        emails: &BTreeSet<String>,
    ) -> StorageResult<InsertReport>;

    /// Moves a target's website out of pending and stamps the attempt time
    ///
    /// # Errors
    ///
    /// * `TargetNotFound` - No website row for this (target, url) pair
    /// * `InvalidTransition` - The row is not pending or `status` is not terminal
    fn update_status(
        &mut self,
        target_id: i64,
        site_url: &str,
        status: TargetStatus,
    ) -> StorageResult<()>;

    // ===== Intake and Lookup =====

    /// Registers an organization with one pending website
    ///
    /// # Returns
    ///
    /// The organization ID, which is the target ID
    fn insert_target(&mut self, name: &str, site_url: &str) -> StorageResult<i64>;

    /// Gets a target by organization ID and site URL
    fn get_target(&self, target_id: i64, site_url: &str) -> StorageResult<TargetRecord>;

    /// Gets all email records for a target, ordered by address
    fn emails_for_target(&self, target_id: i64) -> StorageResult<Vec<EmailRecord>>;

    // ===== Statistics =====

    /// Counts websites in a status
    fn count_targets_by_status(&self, status: TargetStatus) -> StorageResult<u64>;

    /// Counts all stored email records
    fn count_emails(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed and records its totals
    fn complete_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
