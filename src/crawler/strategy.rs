//! Targeted two-hop crawl for a single target
//!
//! The crawl fetches the base page, then at most one hop of same-site
//! contact-intent links found on it. The caller bounds the whole operation
//! with one deadline.

use crate::crawler::emails::extract_emails;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::links::{discover_links_with, ContactKeywords};
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a target's crawl could not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlFailure {
    #[error("Base page {url} could not be fetched: {reason}")]
    BaseFetchFailed { url: String, reason: String },

    #[error("Crawl exceeded its deadline of {after:?}")]
    TimedOut { after: Duration },
}

/// Result of crawling one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Lower-cased addresses found across all visited pages
    pub emails: BTreeSet<String>,
    /// Every URL a fetch was attempted for
    pub visited_urls: BTreeSet<String>,
    /// Set only when the crawl could not complete
    pub error: Option<CrawlFailure>,
}

impl CrawlOutcome {
    /// Outcome for a crawl abandoned at its deadline
    ///
    /// Partial results are dropped so nothing from the attempt is persisted.
    pub fn timed_out(after: Duration) -> Self {
        Self {
            error: Some(CrawlFailure::TimedOut { after }),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Crawls one target's site for contact emails
///
/// # Algorithm
///
/// 1. Fetch the base URL; on failure return with `BaseFetchFailed`
/// 2. Extract emails from the base page
/// 3. Discover same-site contact links on the base page
/// 4. With no candidates, return what was found
/// 5. Fetch each candidate once; a failed candidate is logged and skipped
///
/// # Arguments
///
/// * `fetcher` - The shared page fetcher
/// * `target_id` - Used for logging only
/// * `base_url` - The normalized site URL
/// * `keywords` - Contact-intent vocabulary
pub async fn crawl_target(
    fetcher: &dyn PageFetcher,
    target_id: i64,
    base_url: &Url,
    keywords: &ContactKeywords,
) -> CrawlOutcome {
    let mut outcome = CrawlOutcome::default();
    outcome.visited_urls.insert(base_url.to_string());

    let body = match fetcher.fetch(base_url).await.into_body() {
        Ok(body) => body,
        Err(reason) => {
            tracing::debug!(
                "Target {}: base page {} failed: {}",
                target_id,
                base_url,
                reason
            );
            outcome.error = Some(CrawlFailure::BaseFetchFailed {
                url: base_url.to_string(),
                reason,
            });
            return outcome;
        }
    };

    outcome.emails.extend(extract_emails(&body));

    let mut candidates = discover_links_with(&body, base_url, keywords);
    candidates.remove(base_url);
    drop(body);

    if candidates.is_empty() {
        tracing::debug!("Target {}: no contact links on {}", target_id, base_url);
        return outcome;
    }

    tracing::debug!(
        "Target {}: {} contact link(s) to visit",
        target_id,
        candidates.len()
    );

    for candidate in candidates {
        if !outcome.visited_urls.insert(candidate.to_string()) {
            continue;
        }

        match fetcher.fetch(&candidate).await.into_body() {
            Ok(page) => {
                let found = extract_emails(&page);
                tracing::debug!(
                    "Target {}: {} email(s) on {}",
                    target_id,
                    found.len(),
                    candidate
                );
                outcome.emails.extend(found);
            }
            Err(reason) => {
                tracing::debug!(
                    "Target {}: contact page {} failed: {}",
                    target_id,
                    candidate,
                    reason
                );
            }
        }
    }

    outcome
}
