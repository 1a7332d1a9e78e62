//! Contact-Sweep main entry point
//!
//! This is the command-line interface for the Contact-Sweep email discovery
//! crawler.

use anyhow::{Context, Result};
use clap::Parser;
use contact_sweep::config::{load_config_with_hash, Config};
use contact_sweep::crawler::Coordinator;
use contact_sweep::output::{load_statistics, print_run_summary, print_statistics};
use contact_sweep::storage::SqliteStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Contact-Sweep: targeted contact-email discovery
///
/// Contact-Sweep visits each pending organization's website, follows at most
/// one hop of contact-page links, and records the email addresses it finds.
/// Work runs in small batches that back off under memory pressure.
#[derive(Parser, Debug)]
#[command(name = "contact-sweep")]
#[command(version = "1.0.0")]
#[command(about = "Targeted contact-email discovery", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and list pending targets without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(config, &config_hash)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_sweep(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("contact_sweep=info,warn"),
            1 => EnvFilter::new("contact_sweep=debug,info"),
            2 => EnvFilter::new("contact_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows settings and each target's screening verdict
fn handle_dry_run(config: Config, config_hash: &str) -> Result<()> {
    println!("=== Contact-Sweep Dry Run ===\n");

    let scheduler = &config.scheduler;
    println!("Scheduler Configuration:");
    println!("  Batch size: {}", scheduler.batch_size);
    println!("  Per-target timeout: {}s", scheduler.per_target_timeout_secs);
    println!("  Memory threshold: {:.1}%", scheduler.memory_threshold_pct);
    println!("  Memory pause: {}s", scheduler.memory_pause_secs);
    println!("  Inter-batch pause: {}s", scheduler.inter_batch_pause_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nExtra Blacklisted Domains ({}):", config.blacklist.len());
    for entry in &config.blacklist {
        println!("  - {}", entry.domain);
    }

    let coordinator =
        Coordinator::new(config, config_hash).context("Failed to open the target database")?;
    let preview = coordinator
        .preview()
        .context("Failed to list pending targets")?;

    println!("\nPending Targets ({}):", preview.len());
    let mut crawlable = 0;
    for (target, verdict) in &preview {
        match verdict {
            Ok(url) => {
                crawlable += 1;
                println!("  [{}] {}", target.id, url);
            }
            Err(reason) => println!("  [{}] {} (skip: {})", target.id, target.site_url, reason),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} of {} pending targets", crawlable, preview.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))
        .context("Failed to open the target database")?;
    let stats = load_statistics(&store).context("Failed to load statistics")?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main sweep over the pending backlog
async fn handle_sweep(config: Config, config_hash: &str) -> Result<()> {
    tracing::info!(
        "Batch size {}, per-target timeout {}s, memory threshold {:.1}%",
        config.scheduler.batch_size,
        config.scheduler.per_target_timeout_secs,
        config.scheduler.memory_threshold_pct
    );

    let mut coordinator =
        Coordinator::new(config, config_hash).context("Failed to open the target database")?;

    let summary = coordinator.run().await.context("Sweep aborted")?;
    print_run_summary(&summary);

    Ok(())
}
