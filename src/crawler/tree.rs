//! In-memory crawl tree
//!
//! Nodes are created from discovered links and grow children lazily while
//! the walker expands them.

use crate::state::NodeState;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// A frontier node: one URL and the children discovered from it
#[derive(Debug)]
pub struct CrawlNode {
    url: Url,
    state: Mutex<NodeState>,
    children: Mutex<Vec<Arc<CrawlNode>>>,
}

// Node locks guard plain data, so a poisoned lock is still usable
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CrawlNode {
    /// Creates an unvisited node
    pub fn new(url: Url) -> Arc<Self> {
        Arc::new(Self {
            url,
            state: Mutex::new(NodeState::Unvisited),
            children: Mutex::new(Vec::new()),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> NodeState {
        *relock(&self.state)
    }

    /// Moves the node to `next` if the transition is legal
    ///
    /// # Returns
    ///
    /// `false` (and no change) for an illegal transition
    pub fn advance(&self, next: NodeState) -> bool {
        let mut state = relock(&self.state);
        if state.can_advance_to(&next) {
            *state = next;
            true
        } else {
            tracing::warn!(
                "Ignoring illegal node transition {} -> {} for {}",
                *state,
                next,
                self.url
            );
            false
        }
    }

    /// Attaches a new child node for `url`
    pub fn add_child(&self, url: Url) -> Arc<CrawlNode> {
        let child = CrawlNode::new(url);
        relock(&self.children).push(Arc::clone(&child));
        child
    }

    /// Returns a snapshot of the children in discovery order
    pub fn children(&self) -> Vec<Arc<CrawlNode>> {
        relock(&self.children).clone()
    }

    /// Counts the nodes of the subtree rooted here, this node included
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.subtree_size())
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_children_in_discovery_order() {
        let root = CrawlNode::new(url("https://example.com/"));
        root.add_child(url("https://example.com/a"));
        root.add_child(url("https://example.com/b"));

        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].url().path(), "/a");
        assert_eq!(children[1].url().path(), "/b");
    }

    #[test]
    fn test_subtree_size() {
        let root = CrawlNode::new(url("https://example.com/"));
        let a = root.add_child(url("https://example.com/a"));
        a.add_child(url("https://example.com/a/1"));
        root.add_child(url("https://example.com/b"));

        assert_eq!(root.subtree_size(), 4);
    }

    #[test]
    fn test_advance_rejects_illegal_transition() {
        let node = CrawlNode::new(url("https://example.com/"));
        assert!(!node.advance(NodeState::Forked { children: 1 }));
        assert_eq!(node.state(), NodeState::Unvisited);

        assert!(node.advance(NodeState::Expanding));
        assert!(node.advance(NodeState::Forked { children: 0 }));
        assert!(node.advance(NodeState::Joined));
        assert!(node.state().is_joined());
    }
}
