//! Integration tests for lexicrawl
//!
//! These tests use wiremock to serve small sites and drive full crawl,
//! indexing and search cycles against an in-memory store.

mod common;
mod crawl_tests;
mod search_tests;
