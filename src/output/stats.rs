//! Statistics generation from the index store
//!
//! This module provides functionality for extracting and displaying
//! corpus totals and per-site indexing state from the storage layer.

use crate::state::SiteStatus;
use crate::storage::Storage;
use crate::LexiError;
use serde::Serialize;

/// Corpus totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TotalStatistics {
    pub sites: u64,
    pub pages: u64,
    pub lemmas: u64,

    /// Whether a crawl run is in progress
    pub indexing: bool,
}

/// Indexing state of one site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteStatistics {
    pub url: String,
    pub name: String,
    pub status: SiteStatus,

    /// RFC 3339 time of the last status change
    pub status_time: String,

    /// Last recorded failure, if any
    pub error: Option<String>,
    pub pages: u64,
    pub lemmas: u64,
}

/// Statistics summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total: TotalStatistics,
    pub detailed: Vec<SiteStatistics>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `running` - Whether a crawl run is currently in progress
///
/// # Returns
///
/// * `Ok(Statistics)` - Successfully loaded statistics
/// * `Err(LexiError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage, running: bool) -> Result<Statistics, LexiError> {
    let sites = storage.list_sites()?;

    let mut detailed = Vec::with_capacity(sites.len());
    for site in sites {
        detailed.push(SiteStatistics {
            pages: storage.count_pages(Some(site.id))?,
            lemmas: storage.count_lemmas(Some(site.id))?,
            url: site.url,
            name: site.name,
            status: site.status,
            status_time: site.status_time,
            error: site.last_error,
        });
    }

    let total = TotalStatistics {
        sites: detailed.len() as u64,
        pages: storage.count_pages(None)?,
        lemmas: storage.count_lemmas(None)?,
        indexing: running,
    };

    Ok(Statistics { total, detailed })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &Statistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Sites: {}", stats.total.sites);
    println!("  Pages: {}", stats.total.pages);
    println!("  Lemmas: {}", stats.total.lemmas);
    println!(
        "  Crawl running: {}",
        if stats.total.indexing { "yes" } else { "no" }
    );
    println!();

    if stats.detailed.is_empty() {
        println!("No sites have been indexed yet.");
        return;
    }

    println!("Sites:");
    for site in &stats.detailed {
        println!("  {} ({})", site.name, site.url);
        println!("    Status: {} since {}", site.status, site.status_time);
        println!("    Pages: {}, lemmas: {}", site.pages, site.lemmas);
        if let Some(error) = &site.error {
            println!("    Last error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use std::collections::HashMap;

    #[test]
    fn test_statistics_empty_store() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let stats = load_statistics(&storage, false).unwrap();

        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn test_statistics_per_site() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let a = storage
            .insert_site("https://a.example", "A", SiteStatus::Indexing)
            .unwrap();
        let b = storage
            .insert_site("https://b.example", "B", SiteStatus::Indexing)
            .unwrap();

        let lemmas: HashMap<String, u32> =
            [("crawl".to_string(), 2), ("index".to_string(), 1)].into();
        storage.replace_page(a, "/", 200, "<p>x</p>", &lemmas).unwrap();
        storage.replace_page(a, "/next", 200, "<p>y</p>", &lemmas).unwrap();
        storage
            .update_site_status(b, SiteStatus::Failed, Some("site main page is unavailable"))
            .unwrap();

        let stats = load_statistics(&storage, true).unwrap();
        assert_eq!(stats.total.sites, 2);
        assert_eq!(stats.total.pages, 2);
        assert_eq!(stats.total.lemmas, 2);
        assert!(stats.total.indexing);

        let first = &stats.detailed[0];
        assert_eq!(first.url, "https://a.example");
        assert_eq!(first.pages, 2);
        assert_eq!(first.lemmas, 2);
        assert_eq!(first.status, SiteStatus::Indexing);

        let second = &stats.detailed[1];
        assert_eq!(second.status, SiteStatus::Failed);
        assert_eq!(second.error.as_deref(), Some("site main page is unavailable"));
        assert_eq!(second.pages, 0);
    }

    #[test]
    fn test_statistics_serialization() {
        let stats = Statistics::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total"]["indexing"], false);
        assert!(json["detailed"].as_array().unwrap().is_empty());
    }
}
