//! Storage module for persisting the index
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Site status persistence
//! - Pages, lemmas and weighted index entries
//! - Centralized lemma frequency maintenance

mod maintenance;
mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::SiteStatus;
use crate::LexiError;

use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between the crawler and the search engine
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Opens a storage database and wraps it for sharing
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file, or `:memory:`
///
/// # Returns
///
/// * `Ok(SharedStorage)` - Successfully initialized storage
/// * `Err(LexiError)` - Failed to initialize storage
pub fn open_storage(path: &str) -> Result<SharedStorage, LexiError> {
    let storage = if path == ":memory:" {
        SqliteStorage::open_in_memory()?
    } else {
        SqliteStorage::new(std::path::Path::new(path))?
    };
    Ok(Arc::new(Mutex::new(storage)))
}

/// Locks the shared storage, mapping a poisoned lock to an error
pub fn lock_storage(storage: &SharedStorage) -> Result<MutexGuard<'_, SqliteStorage>, LexiError> {
    storage.lock().map_err(|_| LexiError::LockPoisoned)
}

/// Represents a site in the database
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: String,
    pub last_error: Option<String>,
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub code: u16,
    pub content: String,
}

/// Represents a lemma of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: u32,
}

/// Represents the occurrences of one lemma within one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub id: i64,
    pub page_id: i64,
    pub lemma_id: i64,
    pub weight: u32,
}

/// A lemma whose stored frequency disagrees with its index entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMismatch {
    pub lemma_id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: u32,
    pub entries: u32,
}
