//! Sitesift main entry point
//!
//! This is the command-line interface for the Sitesift site harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sitesift::config::{load_config_with_hash, validate, Config};
use sitesift::crawler::crawl;
use sitesift::output::print_statistics;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sitesift: harvest the text of a single website
///
/// Sitesift crawls every page reachable from the seed URL on the same host,
/// records each link and the text of every linked PDF, and writes the
/// result as a two-column CSV (Title, Link/Content).
#[derive(Parser, Debug)]
#[command(name = "sitesift")]
#[command(version)]
#[command(about = "Harvest links and PDF text from a single website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "seed")]
    config: Option<PathBuf>,

    /// Seed URL (overrides the configuration file)
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Output CSV path (overrides the configuration file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitesift=info,warn"),
            1 => EnvFilter::new("sitesift=debug,info"),
            2 => EnvFilter::new("sitesift=trace,debug"),
            _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!(
                "Configuration loaded (seed: {}, hash: {})",
                config.crawler.seed_url,
                hash
            );
            config
        }
        None => {
            let seed = cli
                .seed
                .as_deref()
                .context("Either a configuration file or --seed is required")?;
            Config::from_seed(seed)
        }
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sitesift Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!(
        "  Politeness delay: {}-{}ms",
        config.crawler.min_delay_ms, config.crawler.max_delay_ms
    );
    println!(
        "  Default Retry-After: {}s",
        config.crawler.default_retry_after_secs
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            on_signal.cancel();
        }
    });

    let stats = crawl(config, cancel).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    if !quiet {
        print_statistics(&stats);
    }

    Ok(())
}
