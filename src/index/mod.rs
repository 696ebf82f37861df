//! Indexing pipeline
//!
//! Fetches pages, reduces their text to lemma counts and stores them with
//! their weighted index entries.

mod pipeline;

pub use pipeline::{IndexOutcome, Indexer};
