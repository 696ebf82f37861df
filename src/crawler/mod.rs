//! Crawler module for site walking
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and throttled link discovery
//! - HTML link extraction
//! - The in-memory crawl tree and the recursive walker
//! - Crawl run coordination

mod coordinator;
mod fetcher;
mod parser;
mod tree;
mod walker;

pub use coordinator::{Coordinator, INTERRUPTED, STOPPED_BY_USER};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use parser::{extract_links, site_links};
pub use tree::CrawlNode;
pub use walker::{walk_node, walk_site, WalkContext};
