//! Statistics generation from the sweep database
//!
//! This module provides functionality for extracting and displaying
//! sweep statistics from the storage layer.

use crate::crawler::RunSummary;
use crate::state::TargetStatus;
use crate::storage::{RunRecord, TargetStore};
use crate::SweepError;

/// Sweep statistics summary
#[derive(Debug, Clone)]
pub struct SweepStatistics {
    /// Total number of target websites
    pub total_targets: u64,

    /// Count of targets by status, in `TargetStatus::all_statuses` order
    pub targets_by_status: Vec<(TargetStatus, u64)>,

    /// Total number of stored email records
    pub total_emails: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl SweepStatistics {
    /// Returns the count for one status
    pub fn count(&self, status: TargetStatus) -> u64 {
        self.targets_by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The store to query
///
/// # Returns
///
/// * `Ok(SweepStatistics)` - Successfully loaded statistics
/// * `Err(SweepError)` - Failed to query statistics
pub fn load_statistics(store: &dyn TargetStore) -> Result<SweepStatistics, SweepError> {
    let mut targets_by_status = Vec::new();
    let mut total_targets = 0;

    for status in TargetStatus::all_statuses() {
        let count = store.count_targets_by_status(status)?;
        total_targets += count;
        targets_by_status.push((status, count));
    }

    let total_emails = store.count_emails()?;
    let latest_run = store.get_latest_run()?;

    Ok(SweepStatistics {
        total_targets,
        targets_by_status,
        total_emails,
        latest_run,
    })
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &SweepStatistics) {
    println!("=== Sweep Statistics ===\n");

    println!("Overview:");
    println!("  Total targets: {}", stats.total_targets);
    println!("  Total emails: {}", stats.total_emails);
    println!();

    println!("Targets by Status:");
    for (status, count) in &stats.targets_by_status {
        println!(
            "  {}: {} ({:.1}%)",
            status,
            count,
            percentage(*count, stats.total_targets)
        );
    }
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Config hash: {}", run.config_hash);
            println!(
                "  Targets: {} seen, {} skipped, {} with email, {} without, {} failed",
                run.totals.targets_seen,
                run.totals.targets_skipped,
                run.totals.with_email,
                run.totals.without_email,
                run.totals.failed
            );
            println!("  Emails inserted: {}", run.totals.emails_inserted);
        }
        None => println!("No runs recorded yet."),
    }
    println!();

    // Hit rate over crawled targets only
    let crawled = stats.total_targets - stats.count(TargetStatus::Pending);
    println!(
        "Email Hit Rate: {:.1}% ({} of {} crawled)",
        percentage(stats.count(TargetStatus::SuccessWithEmail), crawled),
        stats.count(TargetStatus::SuccessWithEmail),
        crawled
    );
}

/// Prints the counters of a finished run
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Sweep Complete ===\n");
    println!("  Targets seen: {}", summary.targets_seen);
    println!("  Skipped at intake: {}", summary.targets_skipped);
    println!("  With email: {}", summary.with_email);
    println!("  Without email: {}", summary.without_email);
    println!("  Failed: {}", summary.failed);
    println!("  Emails inserted: {}", summary.emails_inserted);
    println!("  Duplicate emails: {}", summary.conflicts);
    if summary.persistence_errors > 0 {
        println!("  Persistence errors: {}", summary.persistence_errors);
    }
    println!("  Batches: {}", summary.batches);
    println!("  Memory pauses: {}", summary.memory_pauses);
}
