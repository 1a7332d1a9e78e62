//! Sweep coordinator - run-level orchestration
//!
//! This module owns everything that lives for exactly one run:
//! - Opening the store and recording the run
//! - Launching the shared page fetcher and closing it on every exit path
//! - Loading the pending backlog and handing it to the batch scheduler
//! - Recording the run's totals

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::links::ContactKeywords;
use crate::crawler::scheduler::{BatchScheduler, RunSummary, SchedulerSettings};
use crate::monitor::ResourceMonitor;
use crate::storage::{PendingTarget, SqliteStore, TargetStore};
use crate::url::{screen_target, DomainFilter};
use crate::{IntakeError, SweepError};
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Main sweep coordinator structure
pub struct Coordinator {
    config: Config,
    config_hash: String,
    store: SqliteStore,
    monitor: Option<ResourceMonitor>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash of the configuration file, stamped on the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Store opened
    /// * `Err(SweepError)` - The database could not be opened
    pub fn new(config: Config, config_hash: impl Into<String>) -> Result<Self, SweepError> {
        let store = SqliteStore::new(Path::new(&config.output.database_path))?;

        Ok(Self {
            config,
            config_hash: config_hash.into(),
            store,
            monitor: None,
        })
    }

    /// Replaces the host memory monitor
    pub fn with_monitor(mut self, monitor: ResourceMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Runs the full pending backlog with an HTTP fetcher
    ///
    /// A fetcher that cannot launch fails the run before any target is
    /// touched.
    pub async fn run(&mut self) -> Result<RunSummary, SweepError> {
        let run_id = self.store.create_run(&self.config_hash)?;

        let fetcher = match HttpFetcher::launch(&self.config.user_agent, &self.config.fetcher) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                tracing::error!("Run {} aborted: {}", run_id, e);
                self.mark_failed(run_id);
                return Err(e);
            }
        };

        self.execute(run_id, &fetcher).await
    }

    /// Runs the full pending backlog with a caller-supplied fetcher
    ///
    /// The fetcher is closed when the run ends, whatever the result.
    pub async fn run_with_fetcher(
        &mut self,
        fetcher: &dyn PageFetcher,
    ) -> Result<RunSummary, SweepError> {
        let run_id = match self.store.create_run(&self.config_hash) {
            Ok(id) => id,
            Err(e) => {
                fetcher.close().await;
                return Err(e.into());
            }
        };

        self.execute(run_id, fetcher).await
    }

    /// Screens the backlog without fetching anything
    ///
    /// # Returns
    ///
    /// Each pending target with its normalized URL or the reason it would
    /// be skipped
    pub fn preview(&self) -> Result<Vec<(PendingTarget, Result<Url, IntakeError>)>, SweepError> {
        let filter = self.domain_filter();
        let targets = self.store.list_pending_targets()?;

        Ok(targets
            .into_iter()
            .map(|target| {
                let verdict = screen_target(&target.site_url, &filter);
                (target, verdict)
            })
            .collect())
    }

    async fn execute(
        &mut self,
        run_id: i64,
        fetcher: &dyn PageFetcher,
    ) -> Result<RunSummary, SweepError> {
        let result = self.sweep(run_id, fetcher).await;
        fetcher.close().await;

        match &result {
            Ok(summary) => {
                if let Err(e) = self.store.complete_run(run_id, &summary.totals()) {
                    tracing::error!("Failed to record totals for run {}: {}", run_id, e);
                }
            }
            Err(e) => {
                tracing::error!("Run {} aborted: {}", run_id, e);
                self.mark_failed(run_id);
            }
        }

        result
    }

    async fn sweep(
        &mut self,
        run_id: i64,
        fetcher: &dyn PageFetcher,
    ) -> Result<RunSummary, SweepError> {
        let targets = self.store.list_pending_targets()?;
        tracing::info!(
            "Starting sweep run {}: {} pending target(s)",
            run_id,
            targets.len()
        );

        let start_time = Instant::now();
        let mut scheduler = self.build_scheduler();
        let summary = scheduler.run(&targets, fetcher, &mut self.store).await;

        tracing::info!(
            "Sweep run {} completed in {:?}: {} with email, {} without, {} failed, {} skipped",
            run_id,
            start_time.elapsed(),
            summary.with_email,
            summary.without_email,
            summary.failed,
            summary.targets_skipped
        );

        Ok(summary)
    }

    fn build_scheduler(&mut self) -> BatchScheduler {
        let scheduler_config = &self.config.scheduler;
        let monitor = self
            .monitor
            .take()
            .unwrap_or_else(|| ResourceMonitor::system(scheduler_config.memory_threshold_pct));

        BatchScheduler::new(
            SchedulerSettings::from_config(scheduler_config),
            monitor,
            self.domain_filter(),
            ContactKeywords::with_extra(&self.config.discovery.extra_keywords),
        )
    }

    fn domain_filter(&self) -> DomainFilter {
        DomainFilter::new(self.config.blacklist.iter().map(|entry| entry.domain.clone()))
    }

    fn mark_failed(&mut self, run_id: i64) {
        if let Err(e) = self.store.fail_run(run_id) {
            tracing::error!("Failed to mark run {} as failed: {}", run_id, e);
        }
    }
}

/// Runs the pending backlog once
///
/// This is the main entry point for a sweep. It will:
/// 1. Open the store and record a new run
/// 2. Launch the shared page fetcher
/// 3. Load the pending targets
/// 4. Crawl them in batches under memory and time budgets
/// 5. Close the fetcher and record the run's totals
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file
///
/// # Returns
///
/// * `Ok(RunSummary)` - The backlog was processed
/// * `Err(SweepError)` - The run could not start
///
/// # Example
///
/// ```no_run
/// use contact_sweep::config::load_config_with_hash;
/// use contact_sweep::crawler::run_backlog;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let summary = run_backlog(config, &hash).await?;
/// println!("{} target(s) with email", summary.with_email);
/// # Ok(())
/// # }
/// ```
pub async fn run_backlog(config: Config, config_hash: &str) -> Result<RunSummary, SweepError> {
    let mut coordinator = Coordinator::new(config, config_hash)?;
    coordinator.run().await
}
