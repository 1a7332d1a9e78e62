use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Contact-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub blacklist: Vec<DomainEntry>,
}

/// Batch scheduling and throttling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Number of targets crawled before memory pressure is checked again
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Deadline covering the whole multi-page crawl of one target (seconds)
    #[serde(
        rename = "per-target-timeout-secs",
        default = "default_per_target_timeout_secs"
    )]
    pub per_target_timeout_secs: u64,

    /// Memory usage percentage above which work is suspended
    #[serde(
        rename = "memory-threshold-pct",
        default = "default_memory_threshold_pct"
    )]
    pub memory_threshold_pct: f64,

    /// Cooldown applied when memory usage is above the threshold (seconds)
    #[serde(rename = "memory-pause-secs", default = "default_memory_pause_secs")]
    pub memory_pause_secs: u64,

    /// Fixed pause between consecutive batches (seconds)
    #[serde(
        rename = "inter-batch-pause-secs",
        default = "default_inter_batch_pause_secs"
    )]
    pub inter_batch_pause_secs: u64,
}

impl SchedulerConfig {
    pub fn per_target_timeout(&self) -> Duration {
        Duration::from_secs(self.per_target_timeout_secs)
    }

    pub fn memory_pause(&self) -> Duration {
        Duration::from_secs(self.memory_pause_secs)
    }

    pub fn inter_batch_pause(&self) -> Duration {
        Duration::from_secs(self.inter_batch_pause_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            per_target_timeout_secs: default_per_target_timeout_secs(),
            memory_threshold_pct: default_memory_threshold_pct(),
            memory_pause_secs: default_memory_pause_secs(),
            inter_batch_pause_secs: default_inter_batch_pause_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_per_target_timeout_secs() -> u64 {
    45
}

fn default_memory_threshold_pct() -> f64 {
    90.0
}

fn default_memory_pause_secs() -> u64 {
    30
}

fn default_inter_batch_pause_secs() -> u64 {
    15
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// HTTP page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Timeout for a single page request (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Contact-link discovery configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryConfig {
    /// Keywords added to the built-in contact-intent vocabulary
    #[serde(rename = "extra-keywords", default)]
    pub extra_keywords: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Excluded domain entry, matched as a substring of the target host
#[derive(Debug, Clone, Deserialize)]
pub struct DomainEntry {
    pub domain: String,
}
