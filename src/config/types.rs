use serde::Deserialize;

/// Main configuration structure for Lexicrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub morphology: MorphologyConfig,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Delay before every link discovery request (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Maximum number of fetches in flight across one crawl run
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Walk all configured sites at once instead of one after another
    #[serde(rename = "parallel-sites", default)]
    pub parallel_sites: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
            parallel_sites: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Lexicrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/lexicrawl".to_string(),
        }
    }
}

/// Persistent store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file (`:memory:` for a transient store)
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Search tuning
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Lemmas present on at least this share of the corpus are ignored
    #[serde(
        rename = "frequency-threshold",
        default = "default_frequency_threshold"
    )]
    pub frequency_threshold: f64,

    /// Characters of context kept on each side of a snippet match
    #[serde(rename = "snippet-window", default = "default_snippet_window")]
    pub snippet_window: usize,

    /// Page size used when a caller does not pass a limit
    #[serde(rename = "default-limit", default = "default_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            frequency_threshold: default_frequency_threshold(),
            snippet_window: default_snippet_window(),
            default_limit: default_limit(),
        }
    }
}

/// Morphological dictionary configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MorphologyConfig {
    /// Extra closed-class words, one `word TAG` pair per line
    #[serde(rename = "closed-class-path")]
    pub closed_class_path: Option<String>,
}

/// A crawl root and the scope of its index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteEntry {
    /// Base URL of the site (e.g., "https://example.com")
    pub url: String,

    /// Display name
    pub name: String,
}

fn default_request_delay_ms() -> u64 {
    150
}

fn default_max_concurrent_fetches() -> u32 {
    16
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_frequency_threshold() -> f64 {
    0.9
}

fn default_snippet_window() -> usize {
    30
}

fn default_limit() -> usize {
    20
}
