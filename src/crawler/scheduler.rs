//! Batch scheduler driving the pending backlog
//!
//! This module handles:
//! - Partitioning pending targets into fixed-size batches
//! - Memory backpressure before each batch
//! - The fixed pause between consecutive batches
//! - Per-target deadlines and outcome classification
//! - Persisting emails and status transitions, one target at a time

use crate::config::SchedulerConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::links::ContactKeywords;
use crate::crawler::strategy::{crawl_target, CrawlOutcome};
use crate::monitor::{Pressure, ResourceMonitor};
use crate::state::TargetStatus;
use crate::storage::{PendingTarget, RunTotals, TargetStore};
use crate::url::{screen_target, DomainFilter};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Scheduler settings, fixed for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    /// Targets crawled between memory checks
    pub batch_size: usize,
    /// Deadline for one target's whole crawl
    pub per_target_timeout: Duration,
    /// Suspension applied when memory exceeds the threshold
    pub memory_pause: Duration,
    /// Pause between consecutive batches
    pub inter_batch_pause: Duration,
}

impl SchedulerSettings {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            per_target_timeout: config.per_target_timeout(),
            memory_pause: config.memory_pause(),
            inter_batch_pause: config.inter_batch_pause(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

/// Counters for one pass over the backlog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets handed to the scheduler
    pub targets_seen: u64,
    /// Targets rejected at intake and left pending
    pub targets_skipped: u64,
    pub with_email: u64,
    pub without_email: u64,
    pub failed: u64,
    /// Email rows written
    pub emails_inserted: u64,
    /// Addresses already stored for their target
    pub conflicts: u64,
    /// Targets whose outcome could not be persisted
    pub persistence_errors: u64,
    pub batches: u64,
    pub memory_pauses: u64,
}

impl RunSummary {
    fn record(&mut self, status: TargetStatus) {
        match status {
            TargetStatus::SuccessWithEmail => self.with_email += 1,
            TargetStatus::SuccessNoEmail => self.without_email += 1,
            TargetStatus::Failed => self.failed += 1,
            TargetStatus::Pending => {}
        }
    }

    /// Number of targets moved to a terminal status
    pub fn completed(&self) -> u64 {
        self.with_email + self.without_email + self.failed
    }

    /// Totals stored on the run record
    pub fn totals(&self) -> RunTotals {
        RunTotals {
            targets_seen: self.targets_seen,
            targets_skipped: self.targets_skipped,
            with_email: self.with_email,
            without_email: self.without_email,
            failed: self.failed,
            emails_inserted: self.emails_inserted,
        }
    }
}

/// Maps a crawl outcome to the status it earns
///
/// # Examples
///
/// ```
/// use contact_sweep::crawler::{classify_outcome, CrawlOutcome};
/// use contact_sweep::TargetStatus;
///
/// assert_eq!(
///     classify_outcome(&CrawlOutcome::default()),
///     TargetStatus::SuccessNoEmail
/// );
/// ```
pub fn classify_outcome(outcome: &CrawlOutcome) -> TargetStatus {
    if outcome.error.is_some() {
        TargetStatus::Failed
    } else if outcome.emails.is_empty() {
        TargetStatus::SuccessNoEmail
    } else {
        TargetStatus::SuccessWithEmail
    }
}

/// Drives pending targets through screening, crawling and persistence
///
/// Targets are processed strictly in order, one at a time. No per-target
/// error escapes `run`.
pub struct BatchScheduler {
    settings: SchedulerSettings,
    monitor: ResourceMonitor,
    filter: DomainFilter,
    keywords: ContactKeywords,
}

impl BatchScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `settings` - Batch size, deadline and pauses
    /// * `monitor` - Memory backpressure source
    /// * `filter` - Excluded-domain filter applied at intake
    /// * `keywords` - Contact-intent vocabulary for link discovery
    pub fn new(
        settings: SchedulerSettings,
        monitor: ResourceMonitor,
        filter: DomainFilter,
        keywords: ContactKeywords,
    ) -> Self {
        Self {
            settings,
            monitor,
            filter,
            keywords,
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Processes every target in order
    ///
    /// # Arguments
    ///
    /// * `targets` - Pending targets in store order
    /// * `fetcher` - The run's shared page fetcher
    /// * `store` - Where emails and statuses are written
    ///
    /// # Returns
    ///
    /// Counters for the pass
    pub async fn run(
        &mut self,
        targets: &[PendingTarget],
        fetcher: &dyn PageFetcher,
        store: &mut dyn TargetStore,
    ) -> RunSummary {
        let mut summary = RunSummary {
            targets_seen: targets.len() as u64,
            ..RunSummary::default()
        };

        let batch_size = self.settings.batch_size.max(1);
        let batch_count = targets.len().div_ceil(batch_size);

        for (index, batch) in targets.chunks(batch_size).enumerate() {
            self.apply_backpressure(&mut summary).await;

            tracing::info!(
                "Batch {}/{}: {} target(s)",
                index + 1,
                batch_count,
                batch.len()
            );

            for target in batch {
                self.process_target(target, fetcher, store, &mut summary)
                    .await;
            }
            summary.batches += 1;

            let is_last = index + 1 == batch_count;
            if !is_last && !self.settings.inter_batch_pause.is_zero() {
                tracing::info!(
                    "Pausing {:?} before the next batch",
                    self.settings.inter_batch_pause
                );
                sleep(self.settings.inter_batch_pause).await;
            }
        }

        summary
    }

    /// Samples memory and suspends work while it is over the threshold
    ///
    /// One cooldown per check; the next batch re-samples.
    async fn apply_backpressure(&mut self, summary: &mut RunSummary) {
        match self.monitor.check() {
            Pressure::High(pct) => {
                tracing::warn!(
                    "Memory usage {:.1}% exceeds {:.1}%, pausing for {:?}",
                    pct,
                    self.monitor.threshold_pct(),
                    self.settings.memory_pause
                );
                summary.memory_pauses += 1;
                sleep(self.settings.memory_pause).await;
            }
            Pressure::Normal(pct) => {
                tracing::debug!("Memory usage {:.1}%", pct);
            }
            Pressure::Unknown => {}
        }
    }

    async fn process_target(
        &self,
        target: &PendingTarget,
        fetcher: &dyn PageFetcher,
        store: &mut dyn TargetStore,
        summary: &mut RunSummary,
    ) {
        let base_url = match screen_target(&target.site_url, &self.filter) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    "Skipping target {} ({}): {}",
                    target.id,
                    target.site_url,
                    e
                );
                summary.targets_skipped += 1;
                return;
            }
        };

        tracing::info!("Crawling target {}: {}", target.id, base_url);

        let deadline = self.settings.per_target_timeout;
        let crawl = crawl_target(fetcher, target.id, &base_url, &self.keywords);
        let outcome = match timeout(deadline, crawl).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    "Target {} exceeded its {:?} deadline",
                    target.id,
                    deadline
                );
                CrawlOutcome::timed_out(deadline)
            }
        };

        if let Some(failure) = &outcome.error {
            tracing::warn!("Target {} failed: {}", target.id, failure);
        }

        let status = classify_outcome(&outcome);

        if status == TargetStatus::SuccessWithEmail {
            match store.insert_emails(target.id, &outcome.emails) {
                Ok(report) => {
                    summary.emails_inserted += report.inserted as u64;
                    summary.conflicts += report.conflicts as u64;
                }
                Err(e) => {
                    // Leave the target pending so its emails are found again
                    tracing::error!(
                        "Failed to store emails for target {}: {}",
                        target.id,
                        e
                    );
                    summary.persistence_errors += 1;
                    return;
                }
            }
        }

        match store.update_status(target.id, &target.site_url, status) {
            Ok(()) => {
                summary.record(status);
                tracing::info!(
                    "Target {} -> {} ({} email(s), {} page(s))",
                    target.id,
                    status,
                    outcome.emails.len(),
                    outcome.visited_urls.len()
                );
            }
            Err(e) => {
                tracing::error!(
                    "Failed to update status of target {}: {}",
                    target.id,
                    e
                );
                summary.persistence_errors += 1;
            }
        }
    }
}
