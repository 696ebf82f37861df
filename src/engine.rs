//! Top-level handle tying storage, crawling and search together

use crate::config::Config;
use crate::crawler::{Coordinator, Fetcher, INTERRUPTED};
use crate::index::{IndexOutcome, Indexer};
use crate::output::{load_statistics, Statistics};
use crate::search::{SearchEngine, SearchOutcome, SearchRequest};
use crate::storage::{lock_storage, open_storage, FrequencyMismatch, SharedStorage, Storage};
use crate::text::{Lemmatizer, SnowballMorphology};
use crate::url::SiteScope;
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Crawl control, single-page indexing, search and statistics over one store
#[derive(Clone)]
pub struct Engine {
    storage: SharedStorage,
    coordinator: Coordinator,
    search: SearchEngine,
}

impl Engine {
    /// Opens the engine described by a configuration
    ///
    /// Sites left in `INDEXING` by an earlier process are marked `FAILED`.
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Ready to crawl and search
    /// * `Err(LexiError)` - The store, the closed-class dictionary or the
    ///   HTTP client could not be set up
    pub fn open(config: &Config) -> Result<Self> {
        let storage = open_storage(&config.storage.database_path)?;
        {
            let mut guard = lock_storage(&storage)?;
            let reconciled = guard.fail_interrupted_sites(INTERRUPTED)?;
            if reconciled > 0 {
                warn!("Marked {} interrupted sites as failed", reconciled);
            }
        }

        let morphology = SnowballMorphology::with_dictionary(
            config
                .morphology
                .closed_class_path
                .as_deref()
                .map(Path::new),
        )?;
        let lemmatizer = Lemmatizer::new(Arc::new(morphology));

        let fetcher = Fetcher::from_config(&config.crawler, &config.user_agent)?;
        let scope = Arc::new(SiteScope::from_entries(&config.sites)?);

        let indexer = Indexer::new(
            storage.clone(),
            fetcher.clone(),
            lemmatizer.clone(),
            Arc::clone(&scope),
        );
        let coordinator = Coordinator::new(
            storage.clone(),
            indexer,
            fetcher,
            Arc::clone(&scope),
            config.crawler.parallel_sites,
        );
        let search = SearchEngine::new(
            storage.clone(),
            lemmatizer,
            scope,
            config.search.clone(),
        );

        info!(
            "Engine ready with {} sites, database {}",
            config.sites.len(),
            config.storage.database_path
        );

        Ok(Self {
            storage,
            coordinator,
            search,
        })
    }

    /// Starts a full crawl run in the background
    pub fn start(&self) -> Result<JoinHandle<()>> {
        self.coordinator.start()
    }

    /// Requests a cooperative stop; `false` if nothing is running
    pub fn stop(&self) -> bool {
        self.coordinator.stop()
    }

    pub fn is_running(&self) -> bool {
        self.coordinator.is_running()
    }

    /// Indexes or re-indexes one page of a configured site
    pub async fn index_single_page(&self, url: &str) -> Result<IndexOutcome> {
        self.coordinator.index_single_page(url).await
    }

    pub fn resolve_site_for_url(&self, url: &str) -> Option<String> {
        self.coordinator.resolve_site_for_url(url)
    }

    /// Runs a ranked search
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        self.search.search(request)
    }

    /// Collects corpus totals and per-site detail
    pub fn statistics(&self) -> Result<Statistics> {
        let storage = lock_storage(&self.storage)?;
        load_statistics(&*storage, self.is_running())
    }

    /// Lists lemmas whose frequency disagrees with their entry count
    pub fn consistency_check(&self) -> Result<Vec<FrequencyMismatch>> {
        let storage = lock_storage(&self.storage)?;
        Ok(storage.frequency_mismatches()?)
    }

    /// The shared store
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }
}
