//! Page fetcher implementation
//!
//! This module handles all HTTP requests for the sweep, including:
//! - The `PageFetcher` seam the crawl strategy depends on
//! - Building the shared HTTP client with a proper user agent string
//! - GET requests and Content-Type checks
//! - Error classification

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::SweepError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Builds a successful result, mostly useful for fakes
    pub fn html(final_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Success {
            final_url: final_url.into(),
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the page body, or a description of why there is none
    pub fn into_body(self) -> Result<String, String> {
        match self {
            Self::Success { body, .. } => Ok(body),
            other => Err(other.failure_reason()),
        }
    }

    /// Describes a failed fetch for logs and failure records
    pub fn failure_reason(&self) -> String {
        match self {
            Self::Success { status_code, .. } => format!("HTTP {}", status_code),
            Self::ContentMismatch { content_type } => {
                format!("not an HTML page ({})", content_type)
            }
            Self::HttpError { status_code } => format!("HTTP {}", status_code),
            Self::NetworkError { error } => error.clone(),
        }
    }
}

/// The rendering collaborator: turns a URL into page markup
///
/// One instance is shared by the whole run and closed exactly once when the
/// run ends.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page
    async fn fetch(&self, url: &Url) -> FetchResult;

    /// Releases the fetcher's resources
    async fn close(&self) {}
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetcher` - Request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use contact_sweep::config::{FetcherConfig, UserAgentConfig};
/// use contact_sweep::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ContactSweep".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     contact_email: "bot@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, &FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetcher: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetcher.request_timeout_secs))
        .connect_timeout(Duration::from_secs(fetcher.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if the Content-Type header names an HTML document
///
/// A missing header is accepted; many small business sites omit it.
fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

/// Fetches a URL and classifies the response
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// HTTP-backed page fetcher sharing one client for the whole run
pub struct HttpFetcher {
    client: Client,
    closed: AtomicBool,
}

impl HttpFetcher {
    /// Launches the fetcher
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Ready to fetch
    /// * `Err(SweepError::FetcherLaunch)` - The HTTP client could not be built
    pub fn launch(user_agent: &UserAgentConfig, fetcher: &FetcherConfig) -> Result<Self, SweepError> {
        let client = build_http_client(user_agent, fetcher)
            .map_err(|e| SweepError::FetcherLaunch(e.to_string()))?;

        tracing::debug!("Page fetcher launched as {}", user_agent.header_value());

        Ok(Self {
            client,
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult {
        if self.is_closed() {
            return FetchResult::NetworkError {
                error: "fetcher is closed".to_string(),
            };
        }

        fetch_url(&self.client, url).await
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Page fetcher closed");
        }
    }
}
