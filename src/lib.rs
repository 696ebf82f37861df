//! Lexicrawl: a site crawler with a lemmatized inverted index
//!
//! This crate crawls a configured set of web sites, reduces their visible text
//! to lemmas, stores weighted (page, lemma) entries in SQLite and answers
//! ranked keyword queries against that index.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod index;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Lexicrawl operations
#[derive(Debug, Error)]
pub enum LexiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Morphology error: {0}")]
    Morphology(#[from] text::MorphologyError),

    #[error("Indexing is already running")]
    AlreadyRunning,

    #[error("Page {url} is outside the sites listed in the configuration")]
    OutOfScope { url: String },

    #[error("Site {url} is not configured")]
    UnknownSite { url: String },

    #[error("Site main page is unavailable: {url} ({reason})")]
    SiteUnavailable { url: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Lexicrawl operations
pub type Result<T> = std::result::Result<T, LexiError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::Engine;
pub use search::{SearchHit, SearchOutcome, SearchRequest};
pub use state::{NodeState, SiteStatus};
