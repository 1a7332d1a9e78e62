//! Contact-link discovery
//!
//! This module parses a page's anchors and keeps the ones worth a second
//! fetch: same-site links whose href or visible text carries a
//! contact-intent keyword.

use crate::url::same_site;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Built-in contact-intent vocabulary
pub const DEFAULT_CONTACT_KEYWORDS: &[&str] = &[
    "contacto",
    "contact",
    "nosotros",
    "quienes-somos",
    "about",
    "empresa",
    "company",
];

/// The keyword set used to pick contact pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactKeywords {
    keywords: Vec<String>,
}

impl ContactKeywords {
    /// Builds the built-in vocabulary plus extra keywords
    ///
    /// Extras are lower-cased; blanks and duplicates are dropped.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = DEFAULT_CONTACT_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect();

        for keyword in extra {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Self { keywords }
    }

    /// Returns true if `text` contains any keyword, ignoring case
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for ContactKeywords {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is removed.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url)
}

/// Finds same-site contact-page candidates using the built-in vocabulary
///
/// # Arguments
///
/// * `html` - The page markup
/// * `base_url` - The URL the page was fetched from
///
/// # Returns
///
/// A deduplicated set of absolute URLs, never containing `base_url`
///
/// # Example
///
/// ```
/// use contact_sweep::crawler::discover_links;
/// use url::Url;
///
/// let html = r#"<a href="/contacto">Escríbenos</a><a href="/blog">Blog</a>"#;
/// let base = Url::parse("https://acme.example/").unwrap();
/// let links = discover_links(html, &base);
///
/// assert_eq!(links.len(), 1);
/// assert!(links.contains(&Url::parse("https://acme.example/contacto").unwrap()));
/// ```
pub fn discover_links(html: &str, base_url: &Url) -> BTreeSet<Url> {
    discover_links_with(html, base_url, &ContactKeywords::default())
}

/// Finds same-site contact-page candidates using a given keyword set
pub fn discover_links_with(
    html: &str,
    base_url: &Url,
    keywords: &ContactKeywords,
) -> BTreeSet<Url> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    let mut base = base_url.clone();
    base.set_fragment(None);

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(candidate) = resolve_link(href, &base) else {
            continue;
        };

        if !same_site(&candidate, &base) || is_same_page(&candidate, &base) {
            continue;
        }

        let text: String = element.text().collect();
        if keywords.matches(href) || keywords.matches(&text) {
            links.insert(candidate);
        }
    }

    links
}

/// Same page on the same site, whatever the scheme
fn is_same_page(a: &Url, b: &Url) -> bool {
    same_site(a, b) && a.path() == b.path() && a.query() == b.query()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://acme.example/").unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_keyword_in_href() {
        let html = r#"<html><body><a href="/contacto">Aquí</a></body></html>"#;
        let links = discover_links(html, &base_url());
        assert_eq!(links, BTreeSet::from([url("https://acme.example/contacto")]));
    }

    #[test]
    fn test_keyword_in_anchor_text() {
        let html = r#"<html><body><a href="/p?id=7">Contact Us</a></body></html>"#;
        let links = discover_links(html, &base_url());
        assert_eq!(links, BTreeSet::from([url("https://acme.example/p?id=7")]));
    }

    #[test]
    fn test_non_matching_links_dropped() {
        let html = r#"
            <a href="/blog">Blog</a>
            <a href="/productos">Productos</a>
        "#;
        assert!(discover_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_other_host_excluded() {
        let html = r#"
            <a href="https://other.example/contact">Contact</a>
            <a href="https://sub.acme.example/contact">Contact</a>
        "#;
        assert!(discover_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_base_url_excluded() {
        let html = r##"
            <a href="/">Contact</a>
            <a href="https://acme.example/#contact">Contact</a>
        "##;
        assert!(discover_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_base_url_under_other_scheme_excluded() {
        let html = r#"<a href="http://acme.example/">About Acme</a>"#;
        assert!(discover_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_base_page_itself_excluded_when_it_matches() {
        let base = url("https://acme.example/contacto");
        let html = r#"<a href="/contacto">Contacto</a><a href="/nosotros">Nosotros</a>"#;
        let links = discover_links(html, &base);
        assert_eq!(links, BTreeSet::from([url("https://acme.example/nosotros")]));
    }

    #[test]
    fn test_duplicates_collapse() {
        let html = r##"
            <a href="/contact">Contact</a>
            <a href="https://acme.example/contact">Write to us</a>
            <a href="/contact#form">Form</a>
        "##;
        let links = discover_links(html, &base_url());
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_special_schemes_skipped() {
        let html = r#"
            <a href="mailto:contact@acme.example">contact</a>
            <a href="javascript:contact()">contact</a>
            <a href="tel:+56222222222">contact</a>
        "#;
        assert!(discover_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_case_insensitive_match() {
        let html = r#"<a href="/Quienes-Somos">Equipo</a><a href="/x">ABOUT</a>"#;
        let links = discover_links(html, &base_url());
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_extra_keywords() {
        let keywords = ContactKeywords::with_extra(["Kontakt", " ", "contact"]);
        assert_eq!(keywords.as_slice().len(), DEFAULT_CONTACT_KEYWORDS.len() + 1);

        let html = r#"<a href="/kontakt">Schreiben</a>"#;
        let links = discover_links_with(html, &base_url(), &keywords);
        assert_eq!(links, BTreeSet::from([url("https://acme.example/kontakt")]));
        assert!(discover_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = url("https://acme.example/es/inicio");
        assert_eq!(
            resolve_link("contacto", &base),
            Some(url("https://acme.example/es/contacto"))
        );
    }

    #[test]
    fn test_resolve_strips_fragment() {
        assert_eq!(
            resolve_link("/about#team", &base_url()),
            Some(url("https://acme.example/about"))
        );
        assert_eq!(resolve_link("#team", &base_url()), None);
    }
}
