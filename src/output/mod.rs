//! Output module for reporting on the index
//!
//! This module handles:
//! - Collecting corpus totals and per-site statistics
//! - Printing statistics and search results for the command line

pub mod stats;

pub use stats::{load_statistics, print_statistics, SiteStatistics, Statistics, TotalStatistics};

use crate::search::SearchOutcome;

/// Prints a search outcome to stdout
///
/// # Arguments
///
/// * `outcome` - The outcome to display
/// * `offset` - Offset of the first result, for numbering
pub fn print_search_outcome(outcome: &SearchOutcome, offset: usize) {
    match outcome {
        SearchOutcome::EmptyQuery => println!("Empty search query."),
        SearchOutcome::NoMatches => println!("Nothing found."),
        SearchOutcome::Found { count, results } => {
            println!("Found {} pages\n", count);
            for (i, hit) in results.iter().enumerate() {
                println!("{}. {}{}", offset + i + 1, hit.site, hit.path);
                if !hit.title.is_empty() {
                    println!("   {}", hit.title);
                }
                if !hit.snippet.is_empty() {
                    println!("   {}", hit.snippet);
                }
                println!("   relevance {:.1} ({})", hit.relevance, hit.site_name);
            }
            if results.is_empty() {
                println!("No results at offset {}.", offset);
            }
        }
    }
}
