//! Recursive site walker
//!
//! Each node is expanded, its new children are indexed one by one in
//! discovery order, and then one sub-walk per child is spawned. A node
//! finishes only after all of its sub-walks have joined.

use crate::crawler::tree::CrawlNode;
use crate::crawler::Fetcher;
use crate::index::{IndexOutcome, Indexer};
use crate::state::NodeState;
use crate::url::{normalize_link, ScopedSite};
use crate::{LexiError, Result};
use dashmap::DashSet;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a walk of one site shares between its tasks
pub struct WalkContext {
    pub site: ScopedSite,
    pub indexer: Indexer,
    pub fetcher: Fetcher,
    /// URLs seen during the current crawl run, across all sites
    pub visited: Arc<DashSet<String>>,
    pub cancel: CancellationToken,
}

/// Walks one node and, recursively, everything discovered below it
pub fn walk_node(ctx: Arc<WalkContext>, node: Arc<CrawlNode>) -> BoxFuture<'static, ()> {
    async move {
        if ctx.cancel.is_cancelled() {
            node.advance(NodeState::Joined);
            return;
        }

        ctx.visited.insert(node.url().as_str().to_string());
        node.advance(NodeState::Expanding);

        let links = ctx.fetcher.discover_links(node.url(), &ctx.site.base).await;
        for link in links {
            if ctx.visited.insert(link.as_str().to_string()) {
                node.add_child(link);
            }
        }

        if ctx.cancel.is_cancelled() {
            node.advance(NodeState::Joined);
            return;
        }

        let children = node.children();
        let mut sub_walks = JoinSet::new();

        for child in &children {
            if ctx.cancel.is_cancelled() {
                break;
            }

            match ctx.indexer.index_page(child.url(), &ctx.site).await {
                Ok(IndexOutcome::Skipped { reason }) => {
                    debug!("Skipped {}: {}", child.url(), reason)
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to index {}: {}", child.url(), e),
            }

            sub_walks.spawn(walk_node(Arc::clone(&ctx), Arc::clone(child)));
        }

        node.advance(NodeState::Forked {
            children: children.len(),
        });

        while let Some(joined) = sub_walks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    warn!("Sub-walk below {} panicked: {}", node.url(), e);
                }
            }
        }

        node.advance(NodeState::Joined);
    }
    .boxed()
}

/// Indexes the site root, then walks everything reachable from it
///
/// When the cancellation token fires, the remaining sub-walks of the site are
/// dropped, which aborts their tasks.
///
/// # Returns
///
/// * `Ok(root)` - The crawl tree of the site
/// * `Err(LexiError::SiteUnavailable)` - The root page could not be indexed
pub async fn walk_site(ctx: Arc<WalkContext>) -> Result<Arc<CrawlNode>> {
    let root_url = normalize_link(&ctx.site.base)?;
    ctx.visited.insert(root_url.as_str().to_string());

    if let IndexOutcome::Skipped { reason } = ctx.indexer.index_page(&root_url, &ctx.site).await? {
        return Err(LexiError::SiteUnavailable {
            url: ctx.site.base.clone(),
            reason,
        });
    }

    let root = CrawlNode::new(root_url);

    tokio::select! {
        _ = walk_node(Arc::clone(&ctx), Arc::clone(&root)) => {
            info!("Walk of {} finished with {} nodes", ctx.site.base, root.subtree_size());
        }
        _ = ctx.cancel.cancelled() => {
            info!("Walk of {} abandoned after stop request", ctx.site.base);
        }
    }

    Ok(root)
}
