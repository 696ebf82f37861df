//! Crawler coordinator - crawl run orchestration
//!
//! This module owns the start/stop state of crawl runs:
//! - Resetting the store and registering every configured site
//! - Driving one site walk per site, sequentially or in parallel
//! - Cooperative cancellation through a per-run token
//! - Finalizing each site's status

use crate::crawler::walker::{walk_site, WalkContext};
use crate::crawler::Fetcher;
use crate::index::{IndexOutcome, Indexer};
use crate::state::SiteStatus;
use crate::storage::{lock_storage, SharedStorage, Storage};
use crate::url::{ScopedSite, SiteScope};
use crate::{LexiError, Result};
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Last error recorded on sites that a stop request cut short
pub const STOPPED_BY_USER: &str = "Indexing stopped by user";

/// Last error recorded at startup on sites a previous process left mid-crawl
pub const INTERRUPTED: &str = "Process was interrupted during indexing";

/// Main crawl coordinator
///
/// Cheap to clone; all clones share the same run state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    storage: SharedStorage,
    indexer: Indexer,
    fetcher: Fetcher,
    scope: Arc<SiteScope>,
    parallel_sites: bool,
    running: AtomicBool,
    cancel: Mutex<CancellationToken>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `storage` - Shared store the crawl writes to
    /// * `indexer` - Pipeline used for every discovered page
    /// * `fetcher` - Fetcher used for link discovery
    /// * `scope` - Configured sites, in crawl order
    /// * `parallel_sites` - Walk all sites at once instead of one after another
    pub fn new(
        storage: SharedStorage,
        indexer: Indexer,
        fetcher: Fetcher,
        scope: Arc<SiteScope>,
        parallel_sites: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage,
                indexer,
                fetcher,
                scope,
                parallel_sites,
                running: AtomicBool::new(false),
                cancel: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Returns true while a crawl run is in progress
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Starts a crawl run in the background
    ///
    /// All stored data is cleared and every configured site is registered as
    /// `INDEXING` before this returns.
    ///
    /// # Returns
    ///
    /// * `Ok(JoinHandle)` - Handle that completes when the run is over
    /// * `Err(LexiError::AlreadyRunning)` - A run is already in progress
    pub fn start(&self) -> Result<JoinHandle<()>> {
        // Swapped under the lock stop() cancels through
        let token = {
            let mut current = self.lock_cancel();
            if self
                .inner
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(LexiError::AlreadyRunning);
            }
            *current = CancellationToken::new();
            current.clone()
        };

        let sites = match self.prepare_run() {
            Ok(sites) => sites,
            Err(e) => {
                self.inner.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        info!("Starting crawl run over {} sites", sites.len());
        let coordinator = self.clone();
        Ok(tokio::spawn(async move {
            coordinator.run(token, sites).await;
        }))
    }

    /// Requests a stop of the current run
    ///
    /// # Returns
    ///
    /// `false` if no run is in progress
    pub fn stop(&self) -> bool {
        let current = self.lock_cancel();
        if !self.is_running() {
            return false;
        }

        current.cancel();
        info!("Stop requested");
        true
    }

    /// Indexes or re-indexes one page outside a crawl run
    ///
    /// # Returns
    ///
    /// * `Err(LexiError::OutOfScope)` - The URL is not under any configured site
    pub async fn index_single_page(&self, url: &str) -> Result<IndexOutcome> {
        if self.inner.scope.resolve_str(url).is_none() {
            return Err(LexiError::OutOfScope {
                url: url.to_string(),
            });
        }
        self.inner.indexer.index_url(url).await
    }

    /// Returns the base URL of the configured site that owns `url`
    pub fn resolve_site_for_url(&self, url: &str) -> Option<String> {
        self.inner
            .scope
            .resolve_str(url)
            .map(|site| site.base.clone())
    }

    fn lock_cancel(&self) -> MutexGuard<'_, CancellationToken> {
        match self.inner.cancel.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn prepare_run(&self) -> Result<Vec<(ScopedSite, i64)>> {
        let mut storage = lock_storage(&self.inner.storage)?;
        storage.clear_all()?;

        let mut sites = Vec::new();
        for site in self.inner.scope.sites() {
            let id = storage.insert_site(&site.base, &site.name, SiteStatus::Indexing)?;
            sites.push((site.clone(), id));
        }

        Ok(sites)
    }

    async fn run(self, token: CancellationToken, sites: Vec<(ScopedSite, i64)>) {
        let visited = Arc::new(DashSet::new());
        let start_time = std::time::Instant::now();

        if self.inner.parallel_sites {
            let handles: Vec<_> = sites
                .into_iter()
                .map(|(site, site_id)| {
                    let coordinator = self.clone();
                    let token = token.clone();
                    let visited = Arc::clone(&visited);
                    let handle = tokio::spawn(async move {
                        coordinator.crawl_site(site, site_id, token, visited).await
                    });
                    (site_id, handle)
                })
                .collect();

            for (site_id, handle) in handles {
                if let Err(e) = handle.await {
                    self.record_site_fault(site_id, &format!("site walk aborted: {}", e));
                }
            }
        } else {
            for (site, site_id) in sites {
                let coordinator = self.clone();
                let site_token = token.clone();
                let visited = Arc::clone(&visited);
                let handle = tokio::spawn(async move {
                    coordinator
                        .crawl_site(site, site_id, site_token, visited)
                        .await
                });

                if let Err(e) = handle.await {
                    self.record_site_fault(site_id, &format!("site walk aborted: {}", e));
                }

                if token.is_cancelled() {
                    break;
                }
            }
        }

        if token.is_cancelled() {
            match lock_storage(&self.inner.storage) {
                Ok(mut storage) => match storage.fail_unfinished_sites(STOPPED_BY_USER) {
                    Ok(count) => info!("Crawl stopped; {} sites marked failed", count),
                    Err(e) => error!("Failed to finalize stopped sites: {}", e),
                },
                Err(e) => error!("Failed to finalize stopped sites: {}", e),
            }
        }

        info!(
            "Crawl run finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        self.inner.running.store(false, Ordering::SeqCst);
    }

    async fn crawl_site(
        &self,
        site: ScopedSite,
        site_id: i64,
        token: CancellationToken,
        visited: Arc<DashSet<String>>,
    ) {
        if token.is_cancelled() {
            return;
        }

        info!("Indexing site {} ({})", site.name, site.base);
        let ctx = Arc::new(WalkContext {
            site: site.clone(),
            indexer: self.inner.indexer.clone(),
            fetcher: self.inner.fetcher.clone(),
            visited,
            cancel: token.clone(),
        });

        match walk_site(ctx).await {
            Ok(_) if token.is_cancelled() => {
                // finalized together with the other unfinished sites
            }
            Ok(_) => {
                let result = lock_storage(&self.inner.storage).and_then(|mut storage| {
                    storage
                        .update_site_status(site_id, SiteStatus::Indexed, None)
                        .map_err(LexiError::from)
                });
                match result {
                    Ok(()) => info!("Site {} indexed", site.base),
                    Err(e) => error!("Failed to mark {} indexed: {}", site.base, e),
                }
            }
            Err(e) => {
                warn!("Site {} failed: {}", site.base, e);
                self.record_site_fault(site_id, &e.to_string());
            }
        }
    }

    fn record_site_fault(&self, site_id: i64, message: &str) {
        let result = lock_storage(&self.inner.storage).and_then(|mut storage| {
            storage
                .update_site_status(site_id, SiteStatus::Failed, Some(message))
                .map_err(LexiError::from)
        });

        if let Err(e) = result {
            error!("Failed to record failure of site {}: {}", site_id, e);
        }
    }
}
