//! HTML link extraction
//!
//! Parses page bodies and yields the anchor targets, resolved to canonical
//! absolute URLs. The parse is permissive: malformed HTML never fails, it
//! just yields whatever links can be recovered.

use crate::url::normalize_url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts anchor targets from an HTML body
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` elements, resolved against `page_url`.
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:`, `data:` links
/// - Fragment-only links (same-page anchors)
/// - Links that fail to resolve to an `http`/`https` URL
///
/// The result is deduplicated per call, preserving first-seen order.
/// Duplicates across pages are harmless: the frontier is the authority on
/// at-most-once admission.
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - The URL the body was fetched from, used to resolve
///   relative links
///
/// # Example
///
/// ```
/// use scuttle::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &page_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        // normalize_url rejects non-http(s) schemes, which covers
        // javascript:, mailto:, tel:, and data: hrefs
        let url = match normalize_url(href, Some(page_url)) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping link '{}' on {}: {}", href, page_url, e);
                continue;
            }
        };

        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    links
}
