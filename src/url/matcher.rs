use crate::config::SiteEntry;
use crate::url::normalize::{canonical_base, normalize_link};
use crate::UrlError;
use url::Url;

/// Checks if a URL lies under a site base URL
///
/// `base` must be in canonical form (see [`canonical_base`]). A URL matches
/// when its string form starts with the base and the base ends on a path
/// boundary, so `https://example.com/doc` does not own `https://example.com/docs`.
///
/// # Examples
///
/// ```
/// use lexicrawl::url::{is_within_site, normalize_link};
///
/// let link = normalize_link("https://example.com/docs/intro").unwrap();
/// assert!(is_within_site(&link, "https://example.com"));
/// assert!(is_within_site(&link, "https://example.com/docs"));
/// assert!(!is_within_site(&link, "https://example.com/doc"));
/// assert!(!is_within_site(&link, "https://example.org"));
/// ```
pub fn is_within_site(url: &Url, base: &str) -> bool {
    match url.as_str().strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// A configured crawl root in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedSite {
    /// Canonical base URL (no trailing slash)
    pub base: String,
    /// Display name
    pub name: String,
}

/// The set of configured sites, used to resolve which site owns a URL
#[derive(Debug, Clone, Default)]
pub struct SiteScope {
    sites: Vec<ScopedSite>,
}

impl SiteScope {
    /// Builds the scope from configured site entries, keeping their order
    pub fn from_entries(entries: &[SiteEntry]) -> Result<Self, UrlError> {
        let sites = entries
            .iter()
            .map(|entry| {
                Ok(ScopedSite {
                    base: canonical_base(&entry.url)?,
                    name: entry.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, UrlError>>()?;

        Ok(Self { sites })
    }

    /// Returns the configured sites in configuration order
    pub fn sites(&self) -> &[ScopedSite] {
        &self.sites
    }

    /// Resolves the owning site of a URL by longest base-prefix match
    pub fn resolve(&self, url: &Url) -> Option<&ScopedSite> {
        self.sites
            .iter()
            .filter(|site| is_within_site(url, &site.base))
            .max_by_key(|site| site.base.len())
    }

    /// Resolves the owning site of a URL string
    ///
    /// Returns `None` both for malformed URLs and for URLs outside every site.
    pub fn resolve_str(&self, url: &str) -> Option<&ScopedSite> {
        let url = normalize_link(url).ok()?;
        self.resolve(&url)
    }

    /// Looks up a site by its base URL, tolerating a trailing slash or case differences in the host
    pub fn find_by_base(&self, base: &str) -> Option<&ScopedSite> {
        let canonical = canonical_base(base).ok()?;
        self.sites.iter().find(|site| site.base == canonical)
    }
}
