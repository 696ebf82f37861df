//! Lexicrawl main entry point
//!
//! This is the command-line interface for the Lexicrawl site indexer.

use anyhow::Context;
use clap::Parser;
use lexicrawl::config::{load_config, Config};
use lexicrawl::index::IndexOutcome;
use lexicrawl::output::{print_search_outcome, print_statistics};
use lexicrawl::{Engine, SearchRequest};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lexicrawl: a site crawler with a lemmatized search index
///
/// Lexicrawl crawls the configured sites, reduces their text to lemmas and
/// answers ranked keyword queries against the resulting index.
#[derive(Parser, Debug)]
#[command(name = "lexicrawl")]
#[command(version = "1.0.0")]
#[command(about = "A site crawler with a lemmatized search index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["search", "index_page", "check"])]
    stats: bool,

    /// Search the index and exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["index_page", "check"])]
    search: Option<String>,

    /// Restrict the search to one configured site
    #[arg(long, value_name = "URL", requires = "search")]
    site: Option<String>,

    /// Number of ranked results to skip
    #[arg(long, default_value_t = 0, requires = "search")]
    offset: usize,

    /// Maximum number of results (defaults to search.default-limit)
    #[arg(long, requires = "search")]
    limit: Option<usize>,

    /// Index or re-index a single page and exit
    #[arg(long, value_name = "URL", conflicts_with = "check")]
    index_page: Option<String>,

    /// Verify that lemma frequencies match their index entries
    #[arg(long)]
    check: bool,

    /// Print statistics and search results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded: {} sites", config.sites.len());

    let engine = Engine::open(&config)?;

    if cli.stats {
        handle_stats(&engine, cli.json)
    } else if let Some(query) = &cli.search {
        handle_search(&engine, &config, &cli, query)
    } else if let Some(url) = &cli.index_page {
        handle_index_page(&engine, url).await
    } else if cli.check {
        handle_check(&engine)
    } else {
        handle_crawl(&engine).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexicrawl=info,warn"),
            1 => EnvFilter::new("lexicrawl=debug,info"),
            2 => EnvFilter::new("lexicrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode
fn handle_stats(engine: &Engine, json: bool) -> anyhow::Result<()> {
    let stats = engine.statistics()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_statistics(&stats);
    }
    Ok(())
}

/// Handles the --search mode
fn handle_search(engine: &Engine, config: &Config, cli: &Cli, query: &str) -> anyhow::Result<()> {
    let mut request = SearchRequest::new(query)
        .with_page(cli.offset, cli.limit.unwrap_or(config.search.default_limit));
    if let Some(site) = &cli.site {
        request = request.with_site(site.clone());
    }

    let outcome = engine.search(&request)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_search_outcome(&outcome, cli.offset);
    }
    Ok(())
}

/// Handles the --index-page mode
async fn handle_index_page(engine: &Engine, url: &str) -> anyhow::Result<()> {
    let site = engine
        .resolve_site_for_url(url)
        .with_context(|| format!("{} is outside the configured sites", url))?;
    tracing::info!("Indexing {} for site {}", url, site);

    match engine.index_single_page(url).await? {
        IndexOutcome::Indexed { lemmas, .. } => println!("Indexed {} ({} lemmas)", url, lemmas),
        IndexOutcome::Updated { lemmas, .. } => println!("Updated {} ({} lemmas)", url, lemmas),
        IndexOutcome::Skipped { reason } => println!("Skipped {}: {}", url, reason),
    }
    Ok(())
}

/// Handles the --check mode
fn handle_check(engine: &Engine) -> anyhow::Result<()> {
    let mismatches = engine.consistency_check()?;
    if mismatches.is_empty() {
        println!("✓ Lemma frequencies match their index entries");
        return Ok(());
    }

    for m in &mismatches {
        println!(
            "  site {} lemma '{}': frequency {} but {} entries",
            m.site_id, m.lemma, m.frequency, m.entries
        );
    }
    anyhow::bail!("{} lemmas have inconsistent frequencies", mismatches.len())
}

/// Handles the main crawl operation
async fn handle_crawl(engine: &Engine) -> anyhow::Result<()> {
    let mut handle = engine.start()?;

    tokio::select! {
        result = &mut handle => {
            result.context("crawl task panicked")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, stopping crawl");
            engine.stop();
            handle.await.context("crawl task panicked")?;
        }
    }

    let stats = engine.statistics()?;
    tracing::info!(
        "Crawl finished: {} pages, {} lemmas",
        stats.total.pages,
        stats.total.lemmas
    );
    for site in stats.detailed.iter().filter(|s| s.error.is_some()) {
        tracing::warn!(
            "{} failed: {}",
            site.url,
            site.error.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}
