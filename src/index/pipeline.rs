//! Page indexing: fetch, lemmatize, persist
//!
//! A page is stored only after a 200 response. Storing a page and its lemma
//! occurrences is a single storage transaction, so a re-index either
//! replaces the old rows completely or leaves them untouched.

use crate::crawler::{FetchResult, Fetcher};
use crate::state::SiteStatus;
use crate::storage::{lock_storage, SharedStorage, Storage};
use crate::text::Lemmatizer;
use crate::url::{absolute_address, normalize_link, relative_path, ScopedSite, SiteScope};
use crate::{LexiError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// What happened to a URL handed to the indexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// A new page was stored
    Indexed { page_id: i64, lemmas: usize },

    /// An existing page was re-fetched and its rows replaced
    Updated { page_id: i64, lemmas: usize },

    /// Nothing was stored (non-200 response or fetch failure)
    Skipped { reason: String },
}

impl IndexOutcome {
    /// Returns true if a page row was written
    pub fn is_stored(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }
}

/// Turns fetched pages into pages, lemmas and index entries
#[derive(Clone)]
pub struct Indexer {
    storage: SharedStorage,
    fetcher: Fetcher,
    lemmatizer: Lemmatizer,
    scope: Arc<SiteScope>,
}

impl Indexer {
    /// Creates an indexer
    pub fn new(
        storage: SharedStorage,
        fetcher: Fetcher,
        lemmatizer: Lemmatizer,
        scope: Arc<SiteScope>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            lemmatizer,
            scope,
        }
    }

    /// Indexes or re-indexes a single URL
    ///
    /// A URL whose page already exists with at least one index entry takes
    /// the update path; anything else is indexed fresh.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome)` - What was stored
    /// * `Err(LexiError::OutOfScope)` - No configured site owns the URL
    pub async fn index_url(&self, url: &str) -> Result<IndexOutcome> {
        let parsed = normalize_link(url)?;
        let site = self
            .scope
            .resolve(&parsed)
            .cloned()
            .ok_or_else(|| LexiError::OutOfScope {
                url: url.to_string(),
            })?;
        let path = relative_path(&parsed, &site.base);

        let existing = {
            let storage = lock_storage(&self.storage)?;
            match storage.get_site_by_url(&site.base)? {
                Some(record) => match storage.get_page_by_path(record.id, &path)? {
                    Some(page) if storage.count_entries(page.id)? > 0 => Some(page),
                    _ => None,
                },
                None => None,
            }
        };

        match existing {
            Some(page) => self.update_page(&site, &page.path).await,
            None => self.index_page(&parsed, &site).await,
        }
    }

    /// Fetches and stores a page of a known site
    ///
    /// # Arguments
    ///
    /// * `url` - Canonical page URL
    /// * `site` - The site being walked; a nested site with a longer matching
    ///   base takes the page instead
    ///
    /// # Returns
    ///
    /// * `Ok(IndexOutcome::Indexed)` - Page stored
    /// * `Ok(IndexOutcome::Skipped)` - Non-200 response or fetch failure
    /// * `Err(LexiError)` - Storage failure
    pub async fn index_page(&self, url: &Url, site: &ScopedSite) -> Result<IndexOutcome> {
        let site = self.scope.resolve(url).unwrap_or(site);
        let path = relative_path(url, &site.base);

        match self.fetcher.fetch(url.as_str()).await {
            FetchResult::Success {
                status_code, body, ..
            } => {
                let (page_id, lemmas) = self.store_document(site, &path, status_code, &body)?;
                debug!("Indexed {} ({} lemmas)", url, lemmas);
                Ok(IndexOutcome::Indexed { page_id, lemmas })
            }
            other => {
                let reason = other
                    .failure_reason()
                    .unwrap_or_else(|| "unknown failure".to_string());
                debug!("Not indexing {}: {}", url, reason);
                Ok(IndexOutcome::Skipped { reason })
            }
        }
    }

    /// Re-fetches an existing page and replaces its rows
    ///
    /// The old page keeps its index entries unless the new fetch succeeds.
    pub async fn update_page(&self, site: &ScopedSite, path: &str) -> Result<IndexOutcome> {
        let address = absolute_address(&site.base, path);

        match self.fetcher.fetch(&address).await {
            FetchResult::Success {
                status_code, body, ..
            } => {
                let (page_id, lemmas) = self.store_document(site, path, status_code, &body)?;
                info!("Re-indexed {} ({} lemmas)", address, lemmas);
                Ok(IndexOutcome::Updated { page_id, lemmas })
            }
            other => {
                let reason = other
                    .failure_reason()
                    .unwrap_or_else(|| "unknown failure".to_string());
                warn!("Keeping previous index of {}: {}", address, reason);
                Ok(IndexOutcome::Skipped { reason })
            }
        }
    }

    /// Lemmatizes a fetched body and stores it in one transaction
    ///
    /// # Returns
    ///
    /// The new page ID and the number of distinct lemmas stored
    pub fn store_document(
        &self,
        site: &ScopedSite,
        path: &str,
        code: u16,
        body: &str,
    ) -> Result<(i64, usize)> {
        let lemmas = self.lemmatizer.normalize(body);

        let mut storage = lock_storage(&self.storage)?;
        let record = storage.get_or_insert_site(&site.base, &site.name, SiteStatus::Indexed)?;
        let page_id = storage.replace_page(record.id, path, code, body, &lemmas)?;
        storage.touch_site(record.id)?;

        Ok((page_id, lemmas.len()))
    }

    /// Returns the configured site scope
    pub fn scope(&self) -> &SiteScope {
        &self.scope
    }
}
