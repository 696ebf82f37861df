use lexicrawl::config::{
    Config, CrawlerConfig, MorphologyConfig, SearchConfig, SiteEntry, StorageConfig,
    UserAgentConfig,
};
use lexicrawl::Engine;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration over the given (url, name) sites
pub fn create_test_config(sites: &[(&str, &str)], db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            request_delay_ms: 0,
            max_concurrent_fetches: 8,
            request_timeout_secs: 10,
            parallel_sites: false,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        storage: StorageConfig {
            database_path: db_path.to_string(),
        },
        search: SearchConfig::default(),
        morphology: MorphologyConfig::default(),
        sites: sites
            .iter()
            .map(|(url, name)| SiteEntry {
                url: url.trim_end_matches('/').to_string(),
                name: name.to_string(),
            })
            .collect(),
    }
}

/// Opens an engine with an in-memory store over one mock site
pub fn open_engine(server: &MockServer) -> Engine {
    let config = create_test_config(&[(&server.uri(), "Test Site")], ":memory:");
    Engine::open(&config).expect("Failed to open engine")
}

/// Wraps body markup into a page with a title
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

/// Serves an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Serves an HTML page at `route` after a delay
pub async fn mount_slow_page(server: &MockServer, route: &str, html: String, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html, "text/html")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Runs a full crawl and waits for it to finish
pub async fn crawl(engine: &Engine) {
    let handle = engine.start().expect("Failed to start crawl");
    tokio::time::timeout(Duration::from_secs(30), handle)
        .await
        .expect("Crawl did not finish in time")
        .expect("Crawl task panicked");
    assert!(!engine.is_running());
}
