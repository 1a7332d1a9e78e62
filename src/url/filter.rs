use crate::url::extract_domain;
use url::Url;

/// Domains that never host a target's own contact pages
///
/// Social networks, generic platforms, CDNs and analytics hosts. Matching is
/// by substring of the host, so `m.facebook.com` is covered by `facebook.com`.
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "google.com",
    "whatsapp.com",
    "telegram.org",
    "w3.org",
    "sentry.io",
    "jsdelivr.net",
];

/// Rejects target URLs whose host belongs to an excluded domain
#[derive(Debug, Clone)]
pub struct DomainFilter {
    excluded: Vec<String>,
}

impl DomainFilter {
    /// Creates a filter with the built-in excluded set plus `extra` entries
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut excluded: Vec<String> = DEFAULT_EXCLUDED_DOMAINS
            .iter()
            .map(|d| d.to_string())
            .collect();

        for domain in extra {
            let domain = domain.into().trim().to_lowercase();
            if !domain.is_empty() && !excluded.contains(&domain) {
                excluded.push(domain);
            }
        }

        Self { excluded }
    }

    /// Returns the excluded entry matching this URL's host, if any
    ///
    /// The host is lowercased and a leading `www.` is stripped before the
    /// substring check.
    pub fn matching_entry(&self, url: &Url) -> Option<&str> {
        let domain = extract_domain(url)?;
        let host = domain.strip_prefix("www.").unwrap_or(&domain);

        self.excluded
            .iter()
            .find(|entry| host.contains(entry.as_str()))
            .map(String::as_str)
    }

    /// Returns true if the URL's host contains any excluded domain
    pub fn is_blacklisted(&self, url: &Url) -> bool {
        self.matching_entry(url).is_some()
    }

    /// Number of excluded entries
    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

/// Checks a URL against the built-in excluded-domain set
///
/// # Examples
///
/// ```
/// use url::Url;
/// use contact_sweep::url::is_blacklisted;
///
/// let url = Url::parse("https://www.facebook.com/acme").unwrap();
/// assert!(is_blacklisted(&url));
///
/// let url = Url::parse("https://acme.example/contact").unwrap();
/// assert!(!is_blacklisted(&url));
/// ```
pub fn is_blacklisted(url: &Url) -> bool {
    DomainFilter::default().is_blacklisted(url)
}
