//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::SiteStatus;
use crate::storage::{FrequencyMismatch, IndexRecord, LemmaRecord, PageRecord, SiteRecord};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Lemma frequencies are never written directly by callers: they change only
/// through [`Storage::replace_page`] and [`Storage::remove_page`], which keep
/// every lemma's frequency equal to the number of index entries pointing at it.
pub trait Storage {
    // ===== Site Management =====

    /// Inserts a new site row
    ///
    /// # Returns
    ///
    /// The ID of the newly created site
    fn insert_site(&mut self, url: &str, name: &str, status: SiteStatus) -> StorageResult<i64>;

    /// Gets a site by ID
    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord>;

    /// Gets a site by its base URL
    fn get_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    /// Returns the site with this base URL, creating it with `status` if absent
    fn get_or_insert_site(
        &mut self,
        url: &str,
        name: &str,
        status: SiteStatus,
    ) -> StorageResult<SiteRecord>;

    /// Lists all sites in insertion order
    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Sets the status of a site, stamping its status time
    fn update_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()>;

    /// Stamps the status time of a site without changing its status
    fn touch_site(&mut self, site_id: i64) -> StorageResult<()>;

    /// Marks every site that is not `INDEXED` as `FAILED` with the given message
    ///
    /// # Returns
    ///
    /// The number of sites changed
    fn fail_unfinished_sites(&mut self, message: &str) -> StorageResult<usize>;

    /// Marks every site still `INDEXING` as `FAILED` with the given message
    fn fail_interrupted_sites(&mut self, message: &str) -> StorageResult<usize>;

    /// Deletes all sites, pages, lemmas and index entries
    fn clear_all(&mut self) -> StorageResult<()>;

    // ===== Page Management =====

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    /// Gets a page of a site by its relative path
    fn get_page_by_path(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>>;

    /// Finds pages with this relative path on any site
    fn find_pages_by_path(&self, path: &str) -> StorageResult<Vec<PageRecord>>;

    /// Lists the pages of a site
    fn pages_by_site(&self, site_id: i64) -> StorageResult<Vec<PageRecord>>;

    /// Lists the IDs of all pages, optionally restricted to one site
    fn page_ids(&self, site_id: Option<i64>) -> StorageResult<Vec<i64>>;

    /// Counts pages, optionally restricted to one site
    fn count_pages(&self, site_id: Option<i64>) -> StorageResult<u64>;

    /// Stores a page with its lemma counts in one transaction
    ///
    /// Any page already stored under the same site and path is removed first,
    /// together with its occurrences.
    ///
    /// # Arguments
    ///
    /// * `site_id` - Owning site
    /// * `path` - Path relative to the site base
    /// * `code` - HTTP status code of the fetch
    /// * `content` - Raw fetched body
    /// * `lemmas` - Lemma occurrence counts of the page text
    ///
    /// # Returns
    ///
    /// The ID of the new page row
    fn replace_page(
        &mut self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
        lemmas: &HashMap<String, u32>,
    ) -> StorageResult<i64>;

    /// Removes a page, its index entries and its share of lemma frequencies
    fn remove_page(&mut self, page_id: i64) -> StorageResult<()>;

    // ===== Lemma Management =====

    /// Gets the lemma row of a site for a normalized form
    fn get_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>>;

    /// Gets the lemma rows of every site for a normalized form
    fn lemmas_by_form(&self, lemma: &str) -> StorageResult<Vec<LemmaRecord>>;

    /// Lists the lemmas of a site
    fn lemmas_by_site(&self, site_id: i64) -> StorageResult<Vec<LemmaRecord>>;

    /// Counts lemmas, optionally restricted to one site
    fn count_lemmas(&self, site_id: Option<i64>) -> StorageResult<u64>;

    // ===== Index Entries =====

    /// Lists the index entries of a page
    fn entries_by_page(&self, page_id: i64) -> StorageResult<Vec<IndexRecord>>;

    /// Lists the index entries of a lemma
    fn entries_by_lemma(&self, lemma_id: i64) -> StorageResult<Vec<IndexRecord>>;

    /// Counts the index entries of a page
    fn count_entries(&self, page_id: i64) -> StorageResult<u64>;

    /// Returns the pages carrying an entry for any of the given lemma rows
    ///
    /// # Arguments
    ///
    /// * `lemma_ids` - Lemma rows (one normalized form may span several sites)
    /// * `within` - Optional page subset to restrict the answer to
    ///
    /// # Returns
    ///
    /// Page IDs in ascending order
    fn pages_with_lemmas(
        &self,
        lemma_ids: &[i64],
        within: Option<&HashSet<i64>>,
    ) -> StorageResult<Vec<i64>>;

    /// Sums the weights of all index entries of a page
    fn page_relevance(&self, page_id: i64) -> StorageResult<f64>;

    /// Lists lemmas whose frequency differs from their number of index entries
    fn frequency_mismatches(&self) -> StorageResult<Vec<FrequencyMismatch>>;
}
