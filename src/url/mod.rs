//! URL helpers shared by the fetchers, extractors and resolver
//!
//! Candidate URLs come from untrusted sources (model output, scraped anchors), so every
//! URL is checked here before anything tries to fetch it.

use url::Url;

/// Hosts whose links are noise on every portal page
const SOCIAL_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
    "youtube.com",
];

/// Returns true if `candidate` is a fully-qualified http(s) URL with a host
///
/// # Examples
///
/// ```
/// use grant_harvester::url::is_absolute_http;
///
/// assert!(is_absolute_http("https://example.com/call/1"));
/// assert!(!is_absolute_http("/call/1"));
/// assert!(!is_absolute_http("unknown"));
/// assert!(!is_absolute_http("mailto:grants@example.com"));
/// ```
pub fn is_absolute_http(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Returns the form of a URL used to tell whether it was already visited
///
/// The URL is parsed, which lowercases the scheme and host and applies percent-encoding,
/// and its fragment is dropped. Anything that does not parse is kept trimmed as given.
///
/// # Examples
///
/// ```
/// use grant_harvester::url::visit_key;
///
/// assert_eq!(visit_key("https://Portal.EU/c/1#documents"), "https://portal.eu/c/1");
/// ```
pub fn visit_key(candidate: &str) -> String {
    let candidate = candidate.trim();
    match Url::parse(candidate) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => candidate.to_string(),
    }
}

/// Resolves an href against a base URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Returns true if the URL path names a PDF document
///
/// Query strings and fragments are ignored, so `report.pdf?download=1` still counts.
pub fn is_pdf_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => url.path().to_lowercase().ends_with(".pdf"),
        Err(_) => candidate.to_lowercase().ends_with(".pdf"),
    }
}

/// Returns true if the href points at a social network profile or share link
pub fn is_social_link(href: &str) -> bool {
    let lower = href.to_lowercase();
    SOCIAL_HOSTS.iter().any(|host| lower.contains(host))
}
