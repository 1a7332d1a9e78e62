use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `mailto:` links), it returns None.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase domain/host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use contact_sweep::url::extract_domain;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two URLs belong to the same site
///
/// Two URLs are the same site when their hosts are equal (case-insensitive)
/// and their explicit ports are equal. The scheme is not compared, so an
/// `http://` link on an `https://` page stays on site. `www.example.com` and
/// `example.com` are different sites.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use contact_sweep::url::same_site;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert!(same_site(&base, &Url::parse("https://EXAMPLE.com/contact").unwrap()));
/// assert!(!same_site(&base, &Url::parse("https://blog.example.com/").unwrap()));
/// ```
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => {
            host_a == host_b && a.port() == b.port()
        }
        _ => false,
    }
}
