//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TargetStore trait.

use crate::state::TargetStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TargetStore};
use crate::storage::{
    EmailRecord, InsertReport, PendingTarget, RunRecord, RunStatus, RunTotals, TargetRecord,
};
use crate::SweepError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// SQLite storage backend
///
/// Holds only the database path; every logical operation opens its own
/// connection so no transaction outlives one target's outcome.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// Opens the database once to apply pragmas and the schema.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(SweepError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SweepError> {
        init_database(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the database path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;
        Ok(conn)
    }
}

fn organization_exists(conn: &Connection, target_id: i64) -> StorageResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM organizations WHERE id = ?1",
            params![target_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Returns true if the error is a UNIQUE/foreign-key style constraint failure
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        totals: RunTotals {
            targets_seen: row.get::<_, i64>(5)? as u64,
            targets_skipped: row.get::<_, i64>(6)? as u64,
            with_email: row.get::<_, i64>(7)? as u64,
            without_email: row.get::<_, i64>(8)? as u64,
            failed: row.get::<_, i64>(9)? as u64,
            emails_inserted: row.get::<_, i64>(10)? as u64,
        },
    })
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, targets_seen, \
     targets_skipped, with_email, without_email, failed, emails_inserted";

impl TargetStore for SqliteStore {
    // ===== Scheduler Operations =====

    fn list_pending_targets(&self) -> StorageResult<Vec<PendingTarget>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT organization_id, url FROM websites WHERE scrape_status = ?1 ORDER BY id",
        )?;

        let targets = stmt
            .query_map(params![TargetStatus::Pending.to_db_string()], |row| {
                Ok(PendingTarget {
                    id: row.get(0)?,
                    site_url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(targets)
    }

    fn insert_emails(
        &mut self,
        target_id: i64,
        emails: &BTreeSet<String>,
    ) -> StorageResult<InsertReport> {
        let mut conn = self.connect()?;
        if !organization_exists(&conn, target_id)? {
            return Err(StorageError::TargetNotFound {
                target_id,
                site_url: String::new(),
            });
        }

        let now = Utc::now().to_rfc3339();
        let mut report = InsertReport::default();

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO emails (organization_id, address, created_at) VALUES (?1, ?2, ?3)",
            )?;

            for address in emails {
                match stmt.execute(params![target_id, address, now]) {
                    Ok(_) => report.inserted += 1,
                    Err(e) if is_constraint_violation(&e) => {
                        tracing::warn!(
                            "Email {} already stored for target {}, skipping",
                            address,
                            target_id
                        );
                        report.conflicts += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        tx.commit()?;

        Ok(report)
    }

    fn update_status(
        &mut self,
        target_id: i64,
        site_url: &str,
        status: TargetStatus,
    ) -> StorageResult<()> {
        let conn = self.connect()?;
        let current: Option<String> = conn
            .query_row(
                "SELECT scrape_status FROM websites WHERE organization_id = ?1 AND url = ?2",
                params![target_id, site_url],
                |row| row.get(0),
            )
            .optional()?;

        let current = match current {
            Some(s) => TargetStatus::from_db_string(&s).ok_or_else(|| {
                StorageError::Database(format!("Unknown scrape status in database: {}", s))
            })?,
            None => {
                return Err(StorageError::TargetNotFound {
                    target_id,
                    site_url: site_url.to_string(),
                })
            }
        };

        if !current.can_transition_to(status) {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE websites SET scrape_status = ?1, last_attempt_at = ?2
             WHERE organization_id = ?3 AND url = ?4",
            params![status.to_db_string(), now, target_id, site_url],
        )?;

        Ok(())
    }

    // ===== Intake and Lookup =====

    fn insert_target(&mut self, name: &str, site_url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO organizations (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;
        let target_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO websites (organization_id, url, scrape_status) VALUES (?1, ?2, ?3)",
            params![target_id, site_url, TargetStatus::Pending.to_db_string()],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StorageError::ConstraintViolation(format!(
                    "website {} already registered for target {}",
                    site_url, target_id
                ))
            } else {
                e.into()
            }
        })?;
        tx.commit()?;

        Ok(target_id)
    }

    fn get_target(&self, target_id: i64, site_url: &str) -> StorageResult<TargetRecord> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                "SELECT o.id, o.name, w.url, w.scrape_status, w.last_attempt_at
                 FROM websites w JOIN organizations o ON o.id = w.organization_id
                 WHERE w.organization_id = ?1 AND w.url = ?2",
                params![target_id, site_url],
                |row| {
                    Ok(TargetRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        site_url: row.get(2)?,
                        status: TargetStatus::from_db_string(&row.get::<_, String>(3)?)
                            .unwrap_or(TargetStatus::Pending),
                        last_attempt_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        record.ok_or_else(|| StorageError::TargetNotFound {
            target_id,
            site_url: site_url.to_string(),
        })
    }

    fn emails_for_target(&self, target_id: i64) -> StorageResult<Vec<EmailRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, address, created_at FROM emails
             WHERE organization_id = ?1 ORDER BY address",
        )?;

        let emails = stmt
            .query_map(params![target_id], |row| {
                Ok(EmailRecord {
                    id: row.get(0)?,
                    target_id: row.get(1)?,
                    address: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(emails)
    }

    // ===== Statistics =====

    fn count_targets_by_status(&self, status: TargetStatus) -> StorageResult<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM websites WHERE scrape_status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_emails(&self) -> StorageResult<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM emails", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, targets_seen = ?3,
                 targets_skipped = ?4, with_email = ?5, without_email = ?6, failed = ?7,
                 emails_inserted = ?8
             WHERE id = ?9",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                totals.targets_seen as i64,
                totals.targets_skipped as i64,
                totals.with_email as i64,
                totals.without_email as i64,
                totals.failed as i64,
                totals.emails_inserted as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Failed.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.connect()?
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self
            .connect()?
            .query_row(&sql, [], run_from_row)
            .optional()?;
        Ok(run)
    }
}

/// Opens a database connection and applies the schema
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(Connection)` - Successfully opened/created database
/// * `Err(rusqlite::Error)` - Failed to open database
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("sweep.db")).unwrap();
        (dir, store)
    }

    fn emails(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_store() {
        let (_dir, store) = temp_store();
        assert!(store.path().exists());
    }

    #[test]
    fn test_store_reopens_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.db");

        let mut first = SqliteStore::new(&path).unwrap();
        first.insert_target("Acme", "acme.example").unwrap();

        let second = SqliteStore::new(&path).unwrap();
        assert_eq!(second.list_pending_targets().unwrap().len(), 1);
    }

    #[test]
    fn test_insert_target_is_pending() {
        let (_dir, mut store) = temp_store();
        let id = store.insert_target("Acme", "acme.example").unwrap();

        let target = store.get_target(id, "acme.example").unwrap();
        assert_eq!(target.name, "Acme");
        assert_eq!(target.status, TargetStatus::Pending);
        assert!(target.last_attempt_at.is_none());
    }

    #[test]
    fn test_list_pending_targets_in_intake_order() {
        let (_dir, mut store) = temp_store();
        let a = store.insert_target("A", "a.example").unwrap();
        let b = store.insert_target("B", "b.example").unwrap();
        let c = store.insert_target("C", "c.example").unwrap();

        store
            .update_status(b, "b.example", TargetStatus::Failed)
            .unwrap();

        let pending = store.list_pending_targets().unwrap();
        assert_eq!(
            pending,
            vec![
                PendingTarget::new(a, "a.example"),
                PendingTarget::new(c, "c.example")
            ]
        );
    }

    #[test]
    fn test_insert_emails_reports_conflicts() {
        let (_dir, mut store) = temp_store();
        let id = store.insert_target("Acme", "acme.example").unwrap();

        let first = store
            .insert_emails(id, &emails(&["info@acme.example"]))
            .unwrap();
        assert_eq!(
            first,
            InsertReport {
                inserted: 1,
                conflicts: 0
            }
        );

        let second = store
            .insert_emails(id, &emails(&["info@acme.example", "ventas@acme.example"]))
            .unwrap();
        assert_eq!(
            second,
            InsertReport {
                inserted: 1,
                conflicts: 1
            }
        );

        let stored = store.emails_for_target(id).unwrap();
        let addresses: Vec<_> = stored.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(addresses, vec!["info@acme.example", "ventas@acme.example"]);
    }

    #[test]
    fn test_same_email_for_different_targets() {
        let (_dir, mut store) = temp_store();
        let a = store.insert_target("A", "a.example").unwrap();
        let b = store.insert_target("B", "b.example").unwrap();

        let shared = emails(&["contacto@grupo.example"]);
        assert_eq!(store.insert_emails(a, &shared).unwrap().inserted, 1);
        assert_eq!(store.insert_emails(b, &shared).unwrap().inserted, 1);
        assert_eq!(store.count_emails().unwrap(), 2);
    }

    #[test]
    fn test_insert_emails_unknown_target() {
        let (_dir, mut store) = temp_store();
        let result = store.insert_emails(99, &emails(&["a@b.example"]));
        assert!(matches!(
            result,
            Err(StorageError::TargetNotFound { target_id: 99, .. })
        ));
    }

    #[test]
    fn test_update_status_stamps_attempt_time() {
        let (_dir, mut store) = temp_store();
        let id = store.insert_target("Acme", "acme.example").unwrap();

        store
            .update_status(id, "acme.example", TargetStatus::SuccessNoEmail)
            .unwrap();

        let target = store.get_target(id, "acme.example").unwrap();
        assert_eq!(target.status, TargetStatus::SuccessNoEmail);
        assert!(target.last_attempt_at.is_some());
    }

    #[test]
    fn test_update_status_rejects_second_write() {
        let (_dir, mut store) = temp_store();
        let id = store.insert_target("Acme", "acme.example").unwrap();

        store
            .update_status(id, "acme.example", TargetStatus::Failed)
            .unwrap();
        let result = store.update_status(id, "acme.example", TargetStatus::SuccessWithEmail);

        assert!(matches!(
            result,
            Err(StorageError::InvalidTransition {
                from: TargetStatus::Failed,
                to: TargetStatus::SuccessWithEmail
            })
        ));
        assert_eq!(
            store.get_target(id, "acme.example").unwrap().status,
            TargetStatus::Failed
        );
    }

    #[test]
    fn test_update_status_uses_stored_url_exactly() {
        let (_dir, mut store) = temp_store();
        let id = store.insert_target("Acme", "acme.example").unwrap();

        let result = store.update_status(id, "https://acme.example/", TargetStatus::Failed);
        assert!(matches!(result, Err(StorageError::TargetNotFound { .. })));
    }

    #[test]
    fn test_count_targets_by_status() {
        let (_dir, mut store) = temp_store();
        let a = store.insert_target("A", "a.example").unwrap();
        store.insert_target("B", "b.example").unwrap();

        store
            .update_status(a, "a.example", TargetStatus::SuccessWithEmail)
            .unwrap();

        assert_eq!(
            store
                .count_targets_by_status(TargetStatus::SuccessWithEmail)
                .unwrap(),
            1
        );
        assert_eq!(
            store.count_targets_by_status(TargetStatus::Pending).unwrap(),
            1
        );
        assert_eq!(store.count_targets_by_status(TargetStatus::Failed).unwrap(), 0);
    }

    #[test]
    fn test_run_lifecycle() {
        let (_dir, mut store) = temp_store();
        let run_id = store.create_run("test_hash").unwrap();
        assert!(run_id > 0);

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());

        let totals = RunTotals {
            targets_seen: 3,
            targets_skipped: 1,
            with_email: 1,
            without_email: 1,
            failed: 0,
            emails_inserted: 2,
        };
        store.complete_run(run_id, &totals).unwrap();

        let latest = store.get_latest_run().unwrap().unwrap();
        assert_eq!(latest.id, run_id);
        assert_eq!(latest.status, RunStatus::Completed);
        assert_eq!(latest.totals, totals);
        assert!(latest.finished_at.is_some());
    }

    #[test]
    fn test_fail_run() {
        let (_dir, mut store) = temp_store();
        let run_id = store.create_run("test_hash").unwrap();
        store.fail_run(run_id).unwrap();

        assert_eq!(store.get_run(run_id).unwrap().status, RunStatus::Failed);
    }

    #[test]
    fn test_missing_run() {
        let (_dir, mut store) = temp_store();
        assert!(matches!(
            store.get_run(7),
            Err(StorageError::RunNotFound(7))
        ));
        assert!(store.complete_run(7, &RunTotals::default()).is_err());
        assert!(store.get_latest_run().unwrap().is_none());
    }
}
