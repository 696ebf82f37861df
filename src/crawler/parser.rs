//! HTML link extraction for frontier expansion
//!
//! Only `<a href>` elements inside `<body>` are followed. Links are resolved
//! against the page URL, canonicalized, and then narrowed to the pages of
//! one site that can carry HTML.

use crate::url::{is_excluded_resource, is_within_site, normalize_link};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links of a document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags inside `<body>`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links
/// - Anything that does not resolve to HTTP(S)
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the content was fetched from
///
/// # Returns
///
/// Absolute, fragment-free URLs in document order, without duplicates
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("body a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, page_url) {
                    if seen.insert(url.as_str().to_string()) {
                        links.push(url);
                    }
                }
            }
        }
    }

    links
}

/// Keeps the links that belong to a site and point at HTML pages
pub fn site_links(links: Vec<Url>, site_base: &str) -> Vec<Url> {
    links
        .into_iter()
        .filter(|link| is_within_site(link, site_base) && !is_excluded_resource(link))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid or non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
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

    let absolute = page_url.join(href).ok()?;
    normalize_link(absolute.as_str()).ok()
}
