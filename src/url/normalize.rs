use crate::IntakeError;
use url::Url;

/// Normalizes a raw site URL as it arrives from intake
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. If no scheme is present, prefix `https://`
/// 3. Parse the URL; reject if malformed
/// 4. Reject schemes other than HTTP and HTTPS
/// 5. Reject URLs without a host
///
/// Already-schemed URLs are otherwise left as they are.
///
/// # Arguments
///
/// * `raw` - The site URL string as stored for the target
///
/// # Returns
///
/// * `Some(Url)` - Normalized URL
/// * `None` - The input was empty or could not be turned into an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use contact_sweep::url::normalize_url;
///
/// let url = normalize_url("  example.com/about ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
///
/// assert!(normalize_url("").is_none());
/// ```
pub fn normalize_url(raw: &str) -> Option<Url> {
    try_normalize(raw).ok()
}

/// Same as [`normalize_url`], but reports why the input was rejected
pub fn try_normalize(raw: &str) -> Result<Url, IntakeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::Empty);
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|_| IntakeError::Unparseable(trimmed.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(IntakeError::UnsupportedScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(IntakeError::MissingHost(trimmed.to_string())),
    }
}

/// Checks whether the string starts with `scheme:`
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`.
/// When everything between the `:` and the first `/` is a port number, as in
/// `example.com:8080/about`, the input counts as scheme-less.
fn has_scheme(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return false;
    }

    let port = rest.split('/').next().unwrap_or_default();
    port.is_empty() || !port.chars().all(|c| c.is_ascii_digit())
}
