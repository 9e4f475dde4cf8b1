//! Scuttle main entry point
//!
//! Command-line interface for the same-domain mirroring crawler.

use anyhow::Context;
use clap::Parser;
use scuttle::config::{load_config, validate, Config};
use scuttle::crawler::{Coordinator, CrawlSummary};
use scuttle::url::extract_host;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Scuttle: a same-domain mirroring crawler
///
/// Crawls every page reachable from the seed URL within the seed's domain,
/// up to a depth limit, and mirrors the fetched HTML into a local directory.
#[derive(Parser, Debug)]
#[command(name = "scuttle")]
#[command(version)]
#[command(about = "A same-domain mirroring crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum crawl depth (pages at this depth are fetched but not expanded)
    #[arg(short = 'd', long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Retries for transient fetch failures
    #[arg(short, long, value_name = "N")]
    retries: Option<u32>,

    /// Output directory (defaults to the seed's host name)
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Treat subdomains of the seed host as in scope
    #[arg(long)]
    include_subdomains: bool,

    /// Only follow links whose path ends with this suffix (e.g. ".html")
    #[arg(long, value_name = "SUFFIX")]
    filter: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    validate(&config, &cli.seed).context("Invalid configuration")?;

    let seed = Url::parse(&cli.seed)?;
    tracing::info!(
        "Crawling {} to depth {} with {} workers, output {}",
        seed,
        config.crawler.max_depth,
        config.crawler.concurrency,
        config.output.directory
    );

    let coordinator = Coordinator::new(config, seed).context("Failed to start crawl")?;

    // Ctrl-C stops dispatch; fetches in flight finish and the summary still prints
    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    let summary = coordinator.run().await?;
    print_summary(&summary);

    Ok(())
}

/// Merges the config file (if any) with CLI overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_secs = timeout;
    }
    if let Some(retries) = cli.retries {
        config.crawler.retries = retries;
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
    if cli.include_subdomains {
        config.crawler.include_subdomains = true;
    }
    if let Some(filter) = &cli.filter {
        config.crawler.scope_filter = Some(filter.clone());
    }

    // Default the output directory to the seed's host, like saving a site
    // under its own name
    if config.output.directory.is_empty() {
        if let Ok(url) = Url::parse(&cli.seed) {
            if let Some(host) = extract_host(&url) {
                config.output.directory = host;
            }
        }
    }

    Ok(config)
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scuttle=info,warn"),
            1 => EnvFilter::new("scuttle=debug,info"),
            2 => EnvFilter::new("scuttle=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Prints the end-of-run report
fn print_summary(summary: &CrawlSummary) {
    println!("\n=== Crawl Summary ===");
    println!("Pages fetched:     {}", summary.pages_fetched);
    println!("Pages failed:      {}", summary.pages_failed);
    println!("Pages skipped:     {}", summary.pages_skipped);
    if summary.pages_failed > 0 {
        println!(
            "  HTTP errors: {}, network errors: {}, timeouts: {}",
            summary.http_errors, summary.network_errors, summary.timeouts
        );
    }
    if summary.store_failures > 0 {
        println!("Store failures:    {}", summary.store_failures);
    }
    println!("Bytes stored:      {}", summary.bytes_stored);
    println!("Max depth reached: {}", summary.max_depth_reached);
    println!("URLs discovered:   {}", summary.urls_seen);
}
