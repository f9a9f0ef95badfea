//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk same-domain link crawler.

use anyhow::{bail, Context};
use clap::Parser;
use sitewalk::config::{load_config_with_hash, validate, Config};
use sitewalk::crawler::Coordinator;
use sitewalk::output::{print_statistics, read_report, write_report, CrawlStatistics};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitewalk: a same-domain link crawler
///
/// Sitewalk starts at a seed URL, follows every anchor that stays under the seed's
/// scope, and reports how often each page is linked and whether it could be fetched.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A same-domain link crawler", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start crawling from
    #[arg(value_name = "SEED", required_unless_present = "stats")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the JSON report here (overrides output.report-path)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from a previously written report and exit
    #[arg(long, value_name = "REPORT", conflicts_with_all = ["dry_run", "seed"])]
    stats: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(report_path) = &cli.stats {
        return handle_stats(report_path);
    }

    let config = load(cli.config.as_deref())?;
    let Some(seed) = cli.seed.as_deref() else {
        bail!("a seed URL is required");
    };

    let report_path = cli
        .output
        .clone()
        .or_else(|| config.output.report_path.as_ref().map(PathBuf::from));

    if cli.dry_run {
        handle_dry_run(seed, &config, report_path.as_deref())
    } else {
        handle_crawl(seed, &config, report_path.as_deref()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
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

/// Loads the config file if one was given, defaults otherwise
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: validates the seed and config and shows the plan
fn handle_dry_run(seed: &str, config: &Config, report_path: Option<&Path>) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(seed, config)?;

    println!("=== Sitewalk Dry Run ===\n");

    println!("Seed: {}", coordinator.seed());
    println!("Scope root: {}", coordinator.scope_root());

    println!("\nCrawler Configuration:");
    println!("  Poll interval: {}ms", config.crawler.poll_interval_ms);
    println!("  Max attempts: {}", describe(config.crawler.max_attempts));
    println!(
        "  Max concurrent fetches: {}",
        describe(config.crawler.max_concurrent_fetches)
    );
    println!("  Max passes: {}", describe(config.crawler.max_passes));
    println!(
        "  Strict Content-Type: {}",
        config.crawler.strict_content_type
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nFetch:");
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  Max redirects: {}", config.fetch.max_redirects);

    match report_path {
        Some(path) => println!("\nReport: {}", path.display()),
        None => println!("\nReport: not written"),
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

fn describe<T: std::fmt::Display>(limit: Option<T>) -> String {
    limit.map_or_else(|| "unbounded".to_string(), |value| value.to_string())
}

/// Handles the --stats mode: summarizes a saved report
fn handle_stats(report_path: &Path) -> anyhow::Result<()> {
    println!("Report: {}\n", report_path.display());

    let report = read_report(report_path)
        .with_context(|| format!("failed to read report {}", report_path.display()))?;
    print_statistics(&CrawlStatistics::from_report(&report));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(seed: &str, config: &Config, report_path: Option<&Path>) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(seed, config)?;
    let report = coordinator.run().await;

    if report.complete {
        tracing::info!("Crawl completed successfully");
    } else {
        tracing::warn!("Crawl stopped before every link was visited");
    }

    print_statistics(&CrawlStatistics::from_report(&report));

    if let Some(path) = report_path {
        write_report(&report, path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("\n✓ Report written to: {}", path.display());
    }

    Ok(())
}
