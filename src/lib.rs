//! Contact-Sweep: targeted contact-email discovery
//!
//! This crate crawls each pending target organization's website with a
//! two-hop, keyword-guided traversal, extracts email addresses, and records
//! per-target outcomes, while throttling work against memory and time budgets.

pub mod config;
pub mod crawler;
pub mod monitor;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Contact-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to launch page fetcher: {0}")]
    FetcherLaunch(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Reasons a target's site URL is rejected before any fetch
///
/// These are intake problems, not crawl failures: the target keeps its
/// pending status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Site URL is empty")]
    Empty,

    #[error("Failed to parse URL '{0}'")]
    Unparseable(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL '{0}'")]
    MissingHost(String),

    #[error("Host {host} is on the excluded-domain list")]
    Blacklisted { host: String },
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_backlog, BatchScheduler, CrawlOutcome, RunSummary};
pub use state::TargetStatus;
pub use url::{is_blacklisted, normalize_url, screen_target, DomainFilter};
