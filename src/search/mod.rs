//! Search and ranking engine
//!
//! Queries are lemmatized like documents, filtered by document frequency,
//! intersected over the index and ranked by absolute relevance.

mod engine;
mod snippet;
mod types;

pub use engine::SearchEngine;
pub use snippet::build_snippet;
pub use types::{SearchHit, SearchOutcome, SearchRequest, DEFAULT_LIMIT};
