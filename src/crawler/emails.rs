//! Email address extraction
//!
//! Addresses are matched over the raw markup, so `mailto:` hrefs and
//! obfuscation-free text both count. No deliverability checks are made.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Final labels that mark an image file name such as `logo@2x.png`
const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Extracts every email address in the page, lower-cased and deduplicated
///
/// # Example
///
/// ```
/// use contact_sweep::crawler::extract_emails;
///
/// let html = r#"<a href="mailto:Info@Acme.example">Info@Acme.example</a>"#;
/// let emails = extract_emails(html);
///
/// assert_eq!(emails.len(), 1);
/// assert!(emails.contains("info@acme.example"));
/// ```
pub fn extract_emails(html: &str) -> BTreeSet<String> {
    email_regex()
        .find_iter(html)
        .map(|m| m.as_str().to_lowercase())
        .filter(|address| !is_asset_name(address))
        .collect()
}

fn is_asset_name(address: &str) -> bool {
    address
        .rsplit('.')
        .next()
        .is_some_and(|label| ASSET_EXTENSIONS.contains(&label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_address() {
        let emails = extract_emails("<p>Escríbenos a ventas@acme.example.</p>");
        assert_eq!(emails, BTreeSet::from(["ventas@acme.example".to_string()]));
    }

    #[test]
    fn test_retina_image_names_ignored() {
        let html = r#"<img src="/img/logo@2x.png"><img src="/img/Hero@3X.JPG">
            <p>ventas@acme.example</p>"#;
        let emails = extract_emails(html);
        assert_eq!(emails, BTreeSet::from(["ventas@acme.example".to_string()]));
    }

    #[test]
    fn test_mixed_case_folded() {
        let html = "<p>INFO@ACME.EXAMPLE</p><p>info@acme.example</p><p>Info@Acme.Example</p>";
        let emails = extract_emails(html);
        assert_eq!(emails.len(), 1);
        assert!(emails.contains("info@acme.example"));
    }

    #[test]
    fn test_mailto_href() {
        let html = r#"<a href="mailto:hola@acme.example?subject=Hola">Escríbenos</a>"#;
        assert!(extract_emails(html).contains("hola@acme.example"));
    }

    #[test]
    fn test_multiple_addresses() {
        let html = "a@acme.example, b.c+d@mail.acme.example; e_f@acme.co";
        let emails = extract_emails(html);
        assert_eq!(emails.len(), 3);
        assert!(emails.contains("b.c+d@mail.acme.example"));
    }

    #[test]
    fn test_no_addresses() {
        assert!(extract_emails("<html><body>@acme no email here</body></html>").is_empty());
    }

    #[test]
    fn test_short_tld_rejected() {
        assert!(extract_emails("user@host.c").is_empty());
    }

    #[test]
    fn test_idempotent() {
        let html = "<footer>Contact: info@acme.example | soporte@acme.example</footer>";
        assert_eq!(extract_emails(html), extract_emails(html));
    }
}
