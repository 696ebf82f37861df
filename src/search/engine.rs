//! Search and ranking over the stored index
//!
//! # Query Flow
//!
//! 1. Reject an empty query
//! 2. Reduce the query to lemmas with the same lemmatizer used for indexing
//! 3. Drop lemmas unknown to the index and lemmas present on at least
//!    `frequency-threshold` of the corpus
//! 4. Order the remaining lemmas rarest first
//! 5. Intersect their page sets, starting from the pages of the filtered site
//!    (or of all sites)
//! 6. Confirm each page's text, skip duplicate snippets, score by the sum of
//!    all entry weights of the page
//! 7. Stable sort by descending relevance and cut the requested window

use crate::config::SearchConfig;
use crate::search::snippet::build_snippet;
use crate::search::types::{SearchHit, SearchOutcome, SearchRequest};
use crate::storage::{lock_storage, PageRecord, SharedStorage, SiteRecord, Storage};
use crate::text::{title, visible_text, Lemmatizer};
use crate::url::SiteScope;
use crate::{LexiError, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// A query lemma that survived frequency filtering
#[derive(Debug, Clone)]
struct QueryTerm {
    lemma: String,
    /// Document frequency, summed over the searched sites
    frequency: u64,
    /// Lemma rows carrying this form (one per searched site that has it)
    lemma_ids: Vec<i64>,
}

/// Rows read under the store lock for one search
struct Candidates {
    terms: Vec<QueryTerm>,
    /// Intersected pages in page order, with their relevance
    pages: Vec<(PageRecord, f64)>,
    sites: HashMap<i64, SiteRecord>,
}

struct Ranked {
    page: PageRecord,
    relevance: f64,
    snippet: String,
}

/// Answers ranked keyword queries
#[derive(Clone)]
pub struct SearchEngine {
    storage: SharedStorage,
    lemmatizer: Lemmatizer,
    scope: Arc<SiteScope>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Creates a search engine over the shared store
    pub fn new(
        storage: SharedStorage,
        lemmatizer: Lemmatizer,
        scope: Arc<SiteScope>,
        config: SearchConfig,
    ) -> Self {
        Self {
            storage,
            lemmatizer,
            scope,
            config,
        }
    }

    /// Runs a search
    ///
    /// # Arguments
    ///
    /// * `request` - Query text, optional site filter and result window
    ///
    /// # Returns
    ///
    /// * `Ok(SearchOutcome::EmptyQuery)` - The trimmed query is empty
    /// * `Ok(SearchOutcome::NoMatches)` - Nothing qualified
    /// * `Ok(SearchOutcome::Found)` - Total count and the requested window
    /// * `Err(LexiError::UnknownSite)` - The site filter names no configured site
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let query = request.query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::EmptyQuery);
        }

        let query_lemmas: Vec<String> = self.lemmatizer.normalize(query).into_keys().collect();

        // Only row reads happen under the store lock; markup work runs after it is released
        let candidates = match self.load_candidates(request, &query_lemmas)? {
            Some(candidates) => candidates,
            None => return Ok(SearchOutcome::NoMatches),
        };

        let lemmas: Vec<&str> = candidates.terms.iter().map(|t| t.lemma.as_str()).collect();
        let multi_term = lemmas.len() > 1;
        let mut seen_snippets = HashSet::new();
        let mut ranked = Vec::new();

        for (page, relevance) in candidates.pages {
            if !self
                .lemmatizer
                .contains_lemmas(&visible_text(&page.content), &lemmas)
            {
                continue;
            }

            let snippet = build_snippet(
                &self.lemmatizer,
                &page.content,
                query,
                self.config.snippet_window,
            );
            if multi_term && !snippet.is_empty() && !seen_snippets.insert(snippet.clone()) {
                debug!("Skipping page {} with a duplicate snippet", page.path);
                continue;
            }

            ranked.push(Ranked {
                page,
                relevance,
                snippet,
            });
        }

        // sort_by is stable: equal relevance keeps encounter order
        ranked.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });

        let count = ranked.len();
        if count == 0 {
            return Ok(SearchOutcome::NoMatches);
        }

        let start = request.offset.min(count);
        let end = start.saturating_add(request.limit).min(count);

        let mut results = Vec::with_capacity(end - start);
        for item in ranked.into_iter().skip(start).take(end - start) {
            let (site_url, site_name) = candidates
                .sites
                .get(&item.page.site_id)
                .map(|site| (site.url.clone(), site.name.clone()))
                .unwrap_or_default();

            results.push(SearchHit {
                site: site_url,
                site_name,
                path: item.page.path,
                title: title(&item.page.content).unwrap_or_default(),
                snippet: item.snippet,
                relevance: item.relevance,
            });
        }

        Ok(SearchOutcome::Found { count, results })
    }

    /// Reads the surviving terms and the intersected pages with their relevance
    ///
    /// Returns `None` when the filtered site is not stored or no term survives.
    fn load_candidates(
        &self,
        request: &SearchRequest,
        query_lemmas: &[String],
    ) -> Result<Option<Candidates>> {
        let storage = lock_storage(&self.storage)?;

        let site_id = match &request.site {
            Some(base) => {
                let scoped = self
                    .scope
                    .find_by_base(base)
                    .ok_or_else(|| LexiError::UnknownSite { url: base.clone() })?;
                match storage.get_site_by_url(&scoped.base)? {
                    Some(record) => Some(record.id),
                    None => return Ok(None),
                }
            }
            None => None,
        };

        let terms = self.query_terms(&*storage, query_lemmas, site_id)?;
        if terms.is_empty() {
            return Ok(None);
        }

        let within: HashSet<i64> = storage.page_ids(site_id)?.into_iter().collect();
        let mut page_ids = storage.pages_with_lemmas(&terms[0].lemma_ids, Some(&within))?;
        for term in &terms[1..] {
            if page_ids.is_empty() {
                break;
            }
            let within: HashSet<i64> = page_ids.iter().copied().collect();
            page_ids = storage.pages_with_lemmas(&term.lemma_ids, Some(&within))?;
        }

        let mut pages = Vec::with_capacity(page_ids.len());
        let mut sites: HashMap<i64, SiteRecord> = HashMap::new();
        for page_id in page_ids {
            let page = storage.get_page(page_id)?;
            if !sites.contains_key(&page.site_id) {
                let site = storage.get_site(page.site_id)?;
                sites.insert(site.id, site);
            }
            let relevance = storage.page_relevance(page_id)?;
            pages.push((page, relevance));
        }

        Ok(Some(Candidates {
            terms,
            pages,
            sites,
        }))
    }

    /// Looks up the query lemmas and keeps the discriminating ones, rarest first
    fn query_terms(
        &self,
        storage: &dyn Storage,
        query_lemmas: &[String],
        site_id: Option<i64>,
    ) -> Result<Vec<QueryTerm>> {
        let corpus = storage.count_pages(site_id)? as f64;
        let limit = self.config.frequency_threshold * corpus;

        let mut terms = Vec::new();
        for lemma in query_lemmas {
            let rows = match site_id {
                Some(id) => storage.get_lemma(id, lemma)?.into_iter().collect(),
                None => storage.lemmas_by_form(lemma)?,
            };
            if rows.is_empty() {
                debug!("Query lemma '{}' is not indexed", lemma);
                continue;
            }

            let frequency: u64 = rows.iter().map(|row| u64::from(row.frequency)).sum();
            if frequency as f64 >= limit {
                debug!(
                    "Query lemma '{}' is too common ({} of {} pages)",
                    lemma, frequency, corpus
                );
                continue;
            }

            terms.push(QueryTerm {
                lemma: lemma.clone(),
                frequency,
                lemma_ids: rows.iter().map(|row| row.id).collect(),
            });
        }

        terms.sort_by(|a, b| {
            a.frequency
                .cmp(&b.frequency)
                .then_with(|| a.lemma.cmp(&b.lemma))
        });
        Ok(terms)
    }
}
