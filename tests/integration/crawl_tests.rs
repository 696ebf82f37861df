//! Crawl and indexing scenarios against mock sites

use crate::common::{crawl, create_test_config, html_page, mount_page, mount_slow_page, open_engine};
use lexicrawl::crawler::{INTERRUPTED, STOPPED_BY_USER};
use lexicrawl::index::IndexOutcome;
use lexicrawl::storage::{SqliteStorage, Storage};
use lexicrawl::{Engine, LexiError, SiteStatus};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_two_page_site_builds_index() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("A", r#"<p>test</p><a href="/b">next</a>"#)).await;
    mount_page(&server, "/b", html_page("B", "<p>test</p>")).await;

    let engine = open_engine(&server);
    crawl(&engine).await;

    let storage = engine.storage().lock().unwrap();
    assert_eq!(storage.count_pages(None).unwrap(), 2);

    let lemmas = storage.lemmas_by_form("test").unwrap();
    assert_eq!(lemmas.len(), 1);
    assert_eq!(lemmas[0].frequency, 2);

    let entries = storage.entries_by_lemma(lemmas[0].id).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.weight == 1));

    let site = storage.get_site_by_url(&server.uri()).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Indexed);
    assert!(site.last_error.is_none());
    assert!(storage.frequency_mismatches().unwrap().is_empty());
}

#[tokio::test]
async fn test_page_reachable_twice_is_indexed_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html_page("Home", r#"<a href="/a">a</a> <a href="/b">b</a>"#),
    )
    .await;
    mount_page(&server, "/a", html_page("A", r#"<p>crawler</p><a href="/b">b</a>"#)).await;
    mount_page(&server, "/b", html_page("B", r#"<p>crawler</p><a href="/">home</a>"#)).await;

    let engine = open_engine(&server);
    crawl(&engine).await;

    let storage = engine.storage().lock().unwrap();
    assert_eq!(storage.count_pages(None).unwrap(), 3);

    let paths: Vec<String> = storage
        .find_pages_by_path("/b")
        .unwrap()
        .into_iter()
        .map(|p| p.path)
        .collect();
    assert_eq!(paths, vec!["/b".to_string()]);

    let crawler = storage.lemmas_by_form("crawler").unwrap();
    assert_eq!(crawler[0].frequency, 2);
    assert!(storage.frequency_mismatches().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_html_and_missing_pages_are_not_stored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/data">data</a> <a href="/missing">gone</a> <a href="/photo.jpg">pic</a>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("jpg", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let engine = open_engine(&server);
    crawl(&engine).await;

    let storage = engine.storage().lock().unwrap();
    assert_eq!(storage.count_pages(None).unwrap(), 1);
    let site = storage.get_site_by_url(&server.uri()).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Indexed);
}

#[tokio::test]
async fn test_unavailable_root_fails_only_that_site() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&broken)
        .await;

    let healthy = MockServer::start().await;
    mount_page(&healthy, "/", html_page("Home", "<p>healthy site</p>")).await;

    let config = create_test_config(
        &[(&broken.uri(), "Broken"), (&healthy.uri(), "Healthy")],
        ":memory:",
    );
    let engine = Engine::open(&config).expect("Failed to open engine");
    crawl(&engine).await;

    let stats = engine.statistics().unwrap();
    assert_eq!(stats.detailed.len(), 2);

    let broken_site = &stats.detailed[0];
    assert_eq!(broken_site.status, SiteStatus::Failed);
    assert!(broken_site
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("unavailable"));
    assert_eq!(broken_site.pages, 0);

    let healthy_site = &stats.detailed[1];
    assert_eq!(healthy_site.status, SiteStatus::Indexed);
    assert_eq!(healthy_site.pages, 1);
}

#[tokio::test]
async fn test_stop_fails_unfinished_sites() {
    let first = MockServer::start().await;
    mount_page(&first, "/", html_page("Home", r#"<a href="/slow">slow</a>"#)).await;
    mount_slow_page(
        &first,
        "/slow",
        html_page("Slow", "<p>slow page</p>"),
        Duration::from_secs(10),
    )
    .await;

    let second = MockServer::start().await;
    mount_page(&second, "/", html_page("Home", "<p>never reached</p>")).await;

    let config = create_test_config(
        &[(&first.uri(), "First"), (&second.uri(), "Second")],
        ":memory:",
    );
    let engine = Engine::open(&config).expect("Failed to open engine");

    let handle = engine.start().expect("Failed to start crawl");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(engine.is_running());
    assert!(matches!(engine.start(), Err(LexiError::AlreadyRunning)));

    assert!(engine.stop());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Stopped crawl did not finish in time")
        .expect("Crawl task panicked");

    assert!(!engine.is_running());
    assert!(!engine.stop());

    let stats = engine.statistics().unwrap();
    for site in &stats.detailed {
        assert_eq!(site.status, SiteStatus::Failed);
        assert_eq!(site.error.as_deref(), Some(STOPPED_BY_USER));
    }
    assert_eq!(stats.detailed[1].pages, 0);

    let requests = second.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_stop_right_after_start_cancels_the_new_run() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", r#"<a href="/b">b</a>"#)).await;
    mount_page(&server, "/b", html_page("B", "<p>never stored</p>")).await;

    let engine = open_engine(&server);
    // Leaves pages from a finished run behind
    crawl(&engine).await;

    let handle = engine.start().expect("Failed to start crawl");
    assert!(engine.stop());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Stopped crawl did not finish in time")
        .expect("Crawl task panicked");

    assert!(!engine.is_running());
    let stats = engine.statistics().unwrap();
    assert_eq!(stats.detailed.len(), 1);
    assert_eq!(stats.detailed[0].status, SiteStatus::Failed);
    assert_eq!(stats.detailed[0].error.as_deref(), Some(STOPPED_BY_USER));
    assert_eq!(stats.total.pages, 0);
}

#[tokio::test]
async fn test_parallel_run_fails_only_unavailable_site() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let healthy = MockServer::start().await;
    mount_page(&healthy, "/", html_page("Home", r#"<p>healthy</p><a href="/b">b</a>"#)).await;
    mount_page(&healthy, "/b", html_page("B", "<p>healthy too</p>")).await;

    let mut config = create_test_config(
        &[(&broken.uri(), "Broken"), (&healthy.uri(), "Healthy")],
        ":memory:",
    );
    config.crawler.parallel_sites = true;
    let engine = Engine::open(&config).expect("Failed to open engine");
    crawl(&engine).await;

    let stats = engine.statistics().unwrap();
    assert_eq!(stats.detailed.len(), 2);

    let broken_site = &stats.detailed[0];
    assert_eq!(broken_site.status, SiteStatus::Failed);
    assert!(broken_site
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("unavailable"));
    assert_eq!(broken_site.pages, 0);

    let healthy_site = &stats.detailed[1];
    assert_eq!(healthy_site.status, SiteStatus::Indexed);
    assert!(healthy_site.error.is_none());
    assert_eq!(healthy_site.pages, 2);
}

#[tokio::test]
async fn test_parallel_stop_fails_every_site() {
    let mut servers = Vec::new();
    for _ in 0..2 {
        let server = MockServer::start().await;
        mount_page(&server, "/", html_page("Home", r#"<a href="/slow">slow</a>"#)).await;
        mount_slow_page(
            &server,
            "/slow",
            html_page("Slow", "<p>slow page</p>"),
            Duration::from_secs(10),
        )
        .await;
        servers.push(server);
    }

    let mut config = create_test_config(
        &[(&servers[0].uri(), "First"), (&servers[1].uri(), "Second")],
        ":memory:",
    );
    config.crawler.parallel_sites = true;
    let engine = Engine::open(&config).expect("Failed to open engine");

    let handle = engine.start().expect("Failed to start crawl");
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(engine.stop());

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Stopped crawl did not finish in time")
        .expect("Crawl task panicked");

    assert!(!engine.is_running());
    let stats = engine.statistics().unwrap();
    assert_eq!(stats.detailed.len(), 2);
    for site in &stats.detailed {
        assert_eq!(site.status, SiteStatus::Failed);
        assert_eq!(site.error.as_deref(), Some(STOPPED_BY_USER));
    }
}

#[tokio::test]
async fn test_nested_site_pages_belong_to_longest_prefix() {
    let server = MockServer::start().await;
    let docs_base = format!("{}/docs", server.uri());
    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<p>home</p><a href="/docs/page">page</a> <a href="/docs">docs</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/docs",
        html_page("Docs", r#"<p>docs index</p><a href="/docs/page">page</a>"#),
    )
    .await;
    mount_page(&server, "/docs/page", html_page("Page", "<p>docs page</p>")).await;

    let config = create_test_config(
        &[(&server.uri(), "Root"), (&docs_base, "Docs")],
        ":memory:",
    );
    let engine = Engine::open(&config).expect("Failed to open engine");
    crawl(&engine).await;

    assert_eq!(
        engine.resolve_site_for_url(&format!("{}/page", docs_base)),
        Some(docs_base.clone())
    );

    let storage = engine.storage().lock().unwrap();
    let site_paths = |base: &str| {
        let site = storage.get_site_by_url(base).unwrap().unwrap();
        let mut paths: Vec<String> = storage
            .pages_by_site(site.id)
            .unwrap()
            .into_iter()
            .map(|p| p.path)
            .collect();
        paths.sort();
        (site.status, paths)
    };

    assert_eq!(
        site_paths(&server.uri()),
        (SiteStatus::Indexed, vec!["/".to_string()])
    );
    assert_eq!(
        site_paths(&docs_base),
        (
            SiteStatus::Indexed,
            vec!["/".to_string(), "/page".to_string()]
        )
    );
    assert_eq!(storage.count_pages(None).unwrap(), 3);
}

#[tokio::test]
async fn test_new_run_starts_from_empty_store() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", r#"<p>alpha</p><a href="/b">b</a>"#)).await;
    mount_page(&server, "/b", html_page("B", "<p>alpha beta</p>")).await;

    let engine = open_engine(&server);
    crawl(&engine).await;
    crawl(&engine).await;

    let stats = engine.statistics().unwrap();
    assert_eq!(stats.total.sites, 1);
    assert_eq!(stats.total.pages, 2);

    let storage = engine.storage().lock().unwrap();
    assert_eq!(storage.lemmas_by_form("alpha").unwrap()[0].frequency, 2);
}

#[tokio::test]
async fn test_single_page_out_of_scope() {
    let server = MockServer::start().await;
    let engine = open_engine(&server);

    let result = engine.index_single_page("https://elsewhere.test/page").await;
    assert!(matches!(result, Err(LexiError::OutOfScope { .. })));
    assert!(engine.resolve_site_for_url("https://elsewhere.test/page").is_none());
    assert_eq!(
        engine.resolve_site_for_url(&format!("{}/page", server.uri())),
        Some(server.uri())
    );
}

#[tokio::test]
async fn test_single_page_update_replaces_rows() {
    let server = MockServer::start().await;
    mount_page(&server, "/page", html_page("Page", "<p>alpha beta</p>")).await;

    let engine = open_engine(&server);
    let url = format!("{}/page", server.uri());

    let first = engine.index_single_page(&url).await.unwrap();
    assert!(matches!(first, IndexOutcome::Indexed { lemmas: 2, .. }));

    server.reset().await;
    mount_page(&server, "/page", html_page("Page", "<p>beta gamma gamma</p>")).await;

    let second = engine.index_single_page(&url).await.unwrap();
    assert!(matches!(second, IndexOutcome::Updated { lemmas: 2, .. }));

    {
        let storage = engine.storage().lock().unwrap();
        assert_eq!(storage.count_pages(None).unwrap(), 1);
        assert!(storage.lemmas_by_form("alpha").unwrap().is_empty());
        assert_eq!(storage.lemmas_by_form("beta").unwrap()[0].frequency, 1);
        assert!(storage.frequency_mismatches().unwrap().is_empty());

        let site = storage.get_site_by_url(&server.uri()).unwrap().unwrap();
        assert_eq!(site.status, SiteStatus::Indexed);
    }

    // A failed re-fetch keeps the previous rows
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let third = engine.index_single_page(&url).await.unwrap();
    assert!(matches!(third, IndexOutcome::Skipped { .. }));

    let storage = engine.storage().lock().unwrap();
    assert_eq!(storage.count_pages(None).unwrap(), 1);
    let gamma = storage.lemmas_by_form("gamma").unwrap();
    let entries = storage.entries_by_lemma(gamma[0].id).unwrap();
    assert_eq!(entries[0].weight, 2);
}

#[tokio::test]
async fn test_interrupted_sites_reconciled_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("index.db");
    let db = db_path.to_str().unwrap();

    {
        let mut storage = SqliteStorage::new(&db_path).unwrap();
        storage
            .insert_site("https://example.com", "Example", SiteStatus::Indexing)
            .unwrap();
        storage
            .insert_site("https://done.example", "Done", SiteStatus::Indexed)
            .unwrap();
    }

    let config = create_test_config(&[("https://example.com", "Example")], db);
    let engine = Engine::open(&config).expect("Failed to open engine");

    let stats = engine.statistics().unwrap();
    assert_eq!(stats.detailed[0].status, SiteStatus::Failed);
    assert_eq!(stats.detailed[0].error.as_deref(), Some(INTERRUPTED));
    assert_eq!(stats.detailed[1].status, SiteStatus::Indexed);
}
