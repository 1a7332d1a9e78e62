//! Sweep configuration loading
//!
//! A config file is read once per invocation. Its raw bytes are hashed so
//! each run record names the exact settings it ran with.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a sweep configuration file
///
/// Sections left out of the file take their defaults, so a file holding only
/// `[user-agent]` and `[output]` is enough for a sweep.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - A configuration that passed validation
/// * `Err(ConfigError)` - The file was unreadable, not TOML, or failed a
///   scheduler, fetcher, discovery or blacklist check
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use contact_sweep::config::load_config;
///
/// let config = load_config(Path::new("sweep.toml")).unwrap();
/// println!(
///     "{} targets per batch, {}s per target",
///     config.scheduler.batch_size, config.scheduler.per_target_timeout_secs
/// );
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 of the config file as stored on disk
///
/// Whitespace and comment edits change the hash too; it fingerprints the
/// file, not the parsed settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&content)))
}

/// Loads the configuration together with the fingerprint stamped on the run
///
/// Both come from the same path; the hash is only computed once the file has
/// validated.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
