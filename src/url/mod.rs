//! URL handling module for Contact-Sweep
//!
//! This module provides target URL normalization, host extraction and the
//! excluded-domain filter applied before any fetch.

mod domain;
mod filter;
mod normalize;

use crate::IntakeError;
use ::url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_site};
pub use filter::{is_blacklisted, DomainFilter, DEFAULT_EXCLUDED_DOMAINS};
pub use normalize::{normalize_url, try_normalize};

/// Screens a target's raw site URL before it is crawled
///
/// Normalizes the URL and rejects it if its host is excluded. A rejected
/// target is skipped without any network request.
///
/// # Arguments
///
/// * `raw` - The site URL as stored for the target
/// * `filter` - The excluded-domain filter
///
/// # Returns
///
/// * `Ok(Url)` - The normalized URL to crawl
/// * `Err(IntakeError)` - Why the target was rejected
///
/// # Examples
///
/// ```
/// use contact_sweep::url::{screen_target, DomainFilter};
///
/// let filter = DomainFilter::default();
/// assert!(screen_target("acme.example", &filter).is_ok());
/// assert!(screen_target("www.facebook.com/acme", &filter).is_err());
/// ```
pub fn screen_target(raw: &str, filter: &DomainFilter) -> Result<Url, IntakeError> {
    let url = try_normalize(raw)?;

    if filter.is_blacklisted(&url) {
        return Err(IntakeError::Blacklisted {
            host: extract_domain(&url).unwrap_or_default(),
        });
    }

    Ok(url)
}
