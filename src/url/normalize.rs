use crate::UrlError;
use url::Url;

/// File extensions that never carry indexable HTML
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "eps", "pdf", "doc", "docx", "xls",
    "xlsx", "ppt", "pptx", "zip", "rar", "7z", "gz", "tar", "mp3", "mp4", "avi",
];

/// Query parameters that mark a link as a tracking variant of another page
const TRACKING_PARAMS: &[&str] = &["_ga", "fbclid", "gclid", "yclid"];

/// Parses a link into the canonical form used for deduplication
///
/// Only the fragment is dropped; the query string is kept because the
/// same path with different queries can be a different page.
///
/// # Arguments
///
/// * `url_str` - Absolute URL string
///
/// # Returns
///
/// * `Ok(Url)` - Parsed HTTP(S) URL without fragment
/// * `Err(UrlError)` - Malformed URL, unsupported scheme or no host
///
/// # Examples
///
/// ```
/// use lexicrawl::url::normalize_link;
///
/// let url = normalize_link("https://Example.COM/page#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_link(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Returns the canonical string form of a site base URL (no trailing slash)
pub fn canonical_base(url_str: &str) -> Result<String, UrlError> {
    let url = normalize_link(url_str)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Returns the part of `url` that follows the site base, always starting with `/`
///
/// The caller is expected to have checked that the URL lies under `base`.
///
/// # Examples
///
/// ```
/// use lexicrawl::url::{normalize_link, relative_path};
///
/// let url = normalize_link("https://example.com/docs/intro?lang=en").unwrap();
/// assert_eq!(relative_path(&url, "https://example.com"), "/docs/intro?lang=en");
/// assert_eq!(relative_path(&url, "https://example.com/docs"), "/intro?lang=en");
/// ```
pub fn relative_path(url: &Url, base: &str) -> String {
    let rest = match url.as_str().strip_prefix(base) {
        Some(rest) => rest.to_string(),
        None => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
    };

    if rest.is_empty() {
        "/".to_string()
    } else if rest.starts_with('/') {
        rest
    } else {
        format!("/{}", rest)
    }
}

/// Joins a site base and a stored relative path back into a full address
pub fn absolute_address(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Returns true if the link points at a binary document or a tracking variant
///
/// # Examples
///
/// ```
/// use lexicrawl::url::{is_excluded_resource, normalize_link};
///
/// let image = normalize_link("https://example.com/logo.PNG").unwrap();
/// let page = normalize_link("https://example.com/about").unwrap();
/// assert!(is_excluded_resource(&image));
/// assert!(!is_excluded_resource(&page));
/// ```
pub fn is_excluded_resource(url: &Url) -> bool {
    if url
        .query_pairs()
        .any(|(k, _)| TRACKING_PARAMS.contains(&k.as_ref()) || k.starts_with("utm_"))
    {
        return true;
    }

    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            EXCLUDED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}
