//! Shiori main entry point
//!
//! Command-line maintenance for the Shiori scrape cache.

use anyhow::Context;
use clap::{ArgGroup, Parser};
use shiori::cache::{RecordKind, RecordStore, SearchFilter, SqliteCache};
use shiori::config::{load_config, Config};
use shiori::output::{print_cache_stats, print_search_results, write_export};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shiori: a cache-backed crawler for job postings and profiles
///
/// Inspects and maintains the local cache that the crawler fills: shows
/// statistics, purges old records, searches the archive, and exports it as
/// JSON.
#[derive(Parser, Debug)]
#[command(name = "shiori")]
#[command(version = "1.0.0")]
#[command(about = "Cache maintenance for the Shiori crawler", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["dry_run", "stats", "clear", "search", "export"])
))]
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

    /// Validate config and show the effective settings
    #[arg(long)]
    dry_run: bool,

    /// Show cache statistics and exit
    #[arg(long)]
    stats: bool,

    /// Delete cached records
    #[arg(long)]
    clear: bool,

    /// With --clear, only delete records older than this many days
    #[arg(long, value_name = "DAYS", requires = "clear")]
    older_than_days: Option<u32>,

    /// Search cached records by keyword
    #[arg(long, value_name = "KEYWORD")]
    search: Option<String>,

    /// With --search, only records whose company matches
    #[arg(long, requires = "search")]
    company: Option<String>,

    /// With --search, only records whose location matches
    #[arg(long, requires = "search")]
    location: Option<String>,

    /// With --search, maximum number of results
    #[arg(long, default_value_t = 10)]
    limit: u32,

    /// With --search, search profiles instead of jobs
    #[arg(long, requires = "search")]
    profiles: bool,

    /// Export the whole cache as JSON to this file
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut cache = open_cache(&config)?;

    if cli.stats {
        print_cache_stats(&cache.stats().context("Failed to read cache statistics")?);
    } else if cli.clear {
        handle_clear(&mut cache, cli.older_than_days)?;
    } else if let Some(keyword) = &cli.search {
        let kind = if cli.profiles {
            RecordKind::Profile
        } else {
            RecordKind::Job
        };
        let mut filter = SearchFilter::keyword(keyword.as_str()).with_limit(cli.limit);
        filter.company = cli.company.clone();
        filter.location = cli.location.clone();

        let records = cache
            .search(kind, &filter)
            .context("Failed to search cache")?;
        print_search_results(kind, &records);
    } else if let Some(path) = &cli.export {
        let snapshot = cache.export_all().context("Failed to read cache")?;
        write_export(&snapshot, path)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        println!("✓ Exported cache to: {}", path.display());
    }

    cache.close().context("Failed to close cache database")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shiori=info,warn"),
            1 => EnvFilter::new("shiori=debug,info"),
            2 => EnvFilter::new("shiori=trace,debug"),
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

fn open_cache(config: &Config) -> anyhow::Result<SqliteCache> {
    let path = Path::new(&config.cache.database_path);
    SqliteCache::open(path, config.cache.expiry_days)
        .with_context(|| format!("Failed to open cache database {}", path.display()))
}

/// Handles the --clear mode
fn handle_clear(cache: &mut SqliteCache, older_than_days: Option<u32>) -> anyhow::Result<()> {
    let report = cache
        .clear(older_than_days)
        .context("Failed to clear cache")?;

    match older_than_days {
        Some(days) => println!(
            "✓ Removed {} jobs and {} profiles older than {} days",
            report.jobs_deleted, report.profiles_deleted, days
        ),
        None => println!(
            "✓ Removed all {} jobs and {} profiles",
            report.jobs_deleted, report.profiles_deleted
        ),
    }

    Ok(())
}

/// Handles the --dry-run mode: shows the validated settings
fn handle_dry_run(config: &Config) {
    println!("=== Shiori Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max attempts: {}", config.crawler.max_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Backoff factor: {}", config.crawler.backoff_factor);
    println!("  Wait timeout: {}s", config.crawler.wait_timeout_secs);
    println!("  Page settle: {}ms", config.crawler.page_settle_ms);
    println!("  Scroll passes: {}", config.crawler.scroll_passes);

    println!("\nCache:");
    println!("  Database: {}", config.cache.database_path);
    println!("  Expiry: {} days", config.cache.expiry_days);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Login path: {}", config.site.login_path);
    println!("  Job search path: {}", config.site.job_search_path);

    match &config.credentials {
        Some(credentials) if credentials.is_complete() => {
            println!("\nCredentials: {}", credentials.email)
        }
        Some(_) => println!("\nCredentials: incomplete"),
        None => println!("\nCredentials: none"),
    }

    println!("\n✓ Configuration is valid");
}
