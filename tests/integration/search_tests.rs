//! Search scenarios over crawled mock sites

use crate::common::{crawl, create_test_config, html_page, mount_page, open_engine};
use lexicrawl::{Engine, LexiError, SearchOutcome, SearchRequest};
use wiremock::MockServer;

/// Serves a small site where every page mentions "common"
async fn serve_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        html_page(
            "Home",
            r#"<p>common start</p><a href="/a">a</a> <a href="/b">b</a> <a href="/c">c</a>"#,
        ),
    )
    .await;
    mount_page(
        server,
        "/a",
        html_page("Crawling", "<p>common crawler crawlers crawler text</p>"),
    )
    .await;
    mount_page(
        server,
        "/b",
        html_page("Indexing", "<p>common crawler index</p>"),
    )
    .await;
    mount_page(server, "/c", html_page("Other", "<p>common filler</p>")).await;
}

async fn crawled_engine(server: &MockServer) -> Engine {
    serve_site(server).await;
    let engine = open_engine(server);
    crawl(&engine).await;
    engine
}

#[tokio::test]
async fn test_empty_query_is_signalled() {
    let server = MockServer::start().await;
    let engine = crawled_engine(&server).await;

    let outcome = engine.search(&SearchRequest::new("")).unwrap();
    assert_eq!(outcome, SearchOutcome::EmptyQuery);
}

#[tokio::test]
async fn test_over_common_lemma_returns_nothing() {
    let server = MockServer::start().await;
    let engine = crawled_engine(&server).await;

    // On all four pages, above the 90% threshold
    let outcome = engine.search(&SearchRequest::new("common")).unwrap();
    assert_eq!(outcome, SearchOutcome::NoMatches);
}

#[tokio::test]
async fn test_ranked_results_with_titles_and_snippets() {
    let server = MockServer::start().await;
    let engine = crawled_engine(&server).await;

    let outcome = engine.search(&SearchRequest::new("crawlers")).unwrap();
    assert_eq!(outcome.count(), 2);

    let results = outcome.results();
    assert_eq!(results[0].path, "/a");
    assert_eq!(results[0].title, "Crawling");
    assert_eq!(results[0].site, server.uri());
    assert_eq!(results[0].site_name, "Test Site");
    assert!(results[0].snippet.contains("<b>crawler</b>"));
    assert!(results[0].relevance >= results[1].relevance);
    assert_eq!(results[1].path, "/b");
}

#[tokio::test]
async fn test_multi_word_query_intersects() {
    let server = MockServer::start().await;
    let engine = crawled_engine(&server).await;

    let outcome = engine.search(&SearchRequest::new("crawler index")).unwrap();
    assert_eq!(outcome.count(), 1);
    assert_eq!(outcome.results()[0].path, "/b");
}

#[tokio::test]
async fn test_pagination_returns_prefix() {
    let server = MockServer::start().await;
    let engine = crawled_engine(&server).await;

    let full = engine
        .search(&SearchRequest::new("crawler").with_page(0, 1000))
        .unwrap();
    let first = engine
        .search(&SearchRequest::new("crawler").with_page(0, 1))
        .unwrap();

    assert_eq!(first.count(), full.count());
    assert_eq!(first.results(), &full.results()[..1]);

    let past_end = engine
        .search(&SearchRequest::new("crawler").with_page(10, 5))
        .unwrap();
    assert_eq!(past_end.count(), 2);
    assert!(past_end.results().is_empty());
}

#[tokio::test]
async fn test_site_filter_restricts_results() {
    let first = MockServer::start().await;
    serve_site(&first).await;

    let second = MockServer::start().await;
    mount_page(
        &second,
        "/",
        html_page("Second", r#"<p>crawler on the second site</p><a href="/x">x</a>"#),
    )
    .await;
    mount_page(&second, "/x", html_page("X", "<p>unrelated page</p>")).await;

    let config = create_test_config(
        &[(&first.uri(), "First"), (&second.uri(), "Second")],
        ":memory:",
    );
    let engine = Engine::open(&config).expect("Failed to open engine");
    crawl(&engine).await;

    let everywhere = engine.search(&SearchRequest::new("crawler")).unwrap();
    assert_eq!(everywhere.count(), 3);

    let second_only = engine
        .search(&SearchRequest::new("crawler").with_site(second.uri()))
        .unwrap();
    assert_eq!(second_only.count(), 1);
    assert_eq!(second_only.results()[0].site_name, "Second");
    assert_eq!(second_only.results()[0].path, "/");

    let unknown = engine.search(&SearchRequest::new("crawler").with_site("https://nowhere.test"));
    assert!(matches!(unknown, Err(LexiError::UnknownSite { .. })));
}
