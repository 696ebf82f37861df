//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests bounded by a shared permit pool
//! - Throttled link discovery
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::parser::{extract_links, site_links};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The page answered 200 with an HTML body
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Any status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Short description of a failed fetch, used in logs and site errors
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("unsupported content type '{}'", content_type))
            }
            Self::HttpError { status_code } => Some(format!("HTTP status {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a bounded number of requests in flight
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
    permits: Arc<Semaphore>,
}

impl Fetcher {
    /// Creates a fetcher around an existing client
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `delay` - Pause taken before every link discovery request
    /// * `max_in_flight` - Maximum number of concurrent requests
    pub fn new(client: Client, delay: Duration, max_in_flight: usize) -> Self {
        Self {
            client,
            delay,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Creates a fetcher from the crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client =
            build_http_client(user_agent, Duration::from_secs(crawler.request_timeout_secs))?;
        Ok(Self::new(
            client,
            Duration::from_millis(crawler.request_delay_ms),
            crawler.max_concurrent_fetches as usize,
        ))
    }

    /// Fetches a URL and classifies the outcome
    ///
    /// Only a 200 response with an HTML (or untyped) body counts as success.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return FetchResult::NetworkError {
                    error: "fetcher is shut down".to_string(),
                }
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                return FetchResult::NetworkError { error };
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if status != StatusCode::OK {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.is_empty() && !content_type.contains("html") {
            return FetchResult::ContentMismatch { content_type };
        }

        match response.text().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                body,
            },
            Err(e) => FetchResult::NetworkError {
                error: e.to_string(),
            },
        }
    }

    /// Returns the same-site HTML links of a page
    ///
    /// Waits the configured delay first. Every failure yields an empty list;
    /// callers cannot tell "no links" from "fetch failed".
    ///
    /// # Arguments
    ///
    /// * `url` - Page to expand
    /// * `site_base` - Canonical base URL of the site being walked
    pub async fn discover_links(&self, url: &Url, site_base: &str) -> Vec<Url> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.fetch(url.as_str()).await {
            FetchResult::Success {
                final_url, body, ..
            } => {
                let page_url = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
                site_links(extract_links(&body, &page_url), site_base)
            }
            other => {
                if let Some(reason) = other.failure_reason() {
                    tracing::debug!("No links from {}: {}", url, reason);
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config, Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_from_config() {
        let fetcher = Fetcher::from_config(&CrawlerConfig::default(), &create_test_config());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_failure_reason() {
        let ok = FetchResult::Success {
            final_url: "https://example.com/".to_string(),
            status_code: 200,
            body: String::new(),
        };
        assert!(ok.failure_reason().is_none());

        let not_found = FetchResult::HttpError { status_code: 404 };
        assert_eq!(not_found.failure_reason().unwrap(), "HTTP status 404");
    }

    #[tokio::test]
    async fn test_discover_links_unreachable_is_empty() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(2)).unwrap();
        let fetcher = Fetcher::new(client, Duration::ZERO, 2);
        let url = Url::parse("http://127.0.0.1:9/").unwrap();

        let links = fetcher.discover_links(&url, "http://127.0.0.1:9").await;
        assert!(links.is_empty());
    }
}
