//! Crawler module for contact discovery
//!
//! This module contains the core sweep logic, including:
//! - The page fetcher seam and its HTTP implementation
//! - Contact-link discovery and email extraction
//! - The bounded two-hop crawl of one target
//! - Batch scheduling with memory backpressure and deadlines
//! - Overall run coordination

mod coordinator;
mod emails;
mod fetcher;
mod links;
mod scheduler;
mod strategy;

pub use coordinator::{run_backlog, Coordinator};
pub use emails::extract_emails;
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, PageFetcher};
pub use links::{
    discover_links, discover_links_with, resolve_link, ContactKeywords, DEFAULT_CONTACT_KEYWORDS,
};
pub use scheduler::{classify_outcome, BatchScheduler, RunSummary, SchedulerSettings};
pub use strategy::{crawl_target, CrawlFailure, CrawlOutcome};
