//! Grant-Harvester main entry point
//!
//! This is the command-line interface for the Grant-Harvester opportunity crawler.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use grant_harvester::config::{load_config_with_hash, Config, FetcherBackend};
use grant_harvester::crawler::harvest;
use grant_harvester::extract::{build_extractor, Extractor};
use grant_harvester::fetch::{build_http_client, BrowserSession, HttpFetcher, PageFetcher};
use grant_harvester::output::{print_summary, RunSummary};
use grant_harvester::FieldName;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Grant-Harvester: a completeness-driven opportunity harvester
///
/// Grant-Harvester walks the list pages of a funding or tender portal and resolves each
/// listed opportunity into a record, following follow-up links until every required
/// field is known. Records are written to a timestamped CSV file.
#[derive(Parser, Debug)]
#[command(name = "grant-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A completeness-driven opportunity harvester", long_about = None)]
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

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Override the page fetcher backend from the config
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Browser,
    Http,
}

impl From<BackendArg> for FetcherBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Browser => FetcherBackend::Browser,
            BackendArg::Http => FetcherBackend::Http,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(backend) = cli.backend {
        config.fetcher.backend = backend.into();
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match handle_harvest(&config).await? {
        Some(summary) => print_summary(&summary),
        None => println!("Harvest interrupted; records resolved so far are saved."),
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("grant_harvester=info,warn"),
            1 => EnvFilter::new("grant_harvester=debug,info"),
            2 => EnvFilter::new("grant_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Grant-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Target URL: {}", config.crawler.target_url);
    println!("  Max list pages: {}", config.crawler.max_pages);
    println!("  Max records: {}", config.crawler.max_records);
    println!("  Max deep links per record: {}", config.crawler.max_deep_links);
    println!("  Deep link delay: {}ms", config.crawler.deep_link_delay_ms);
    let required: Vec<&str> = config
        .crawler
        .required_fields
        .iter()
        .map(FieldName::key)
        .collect();
    println!("  Required fields ({}): {}", required.len(), required.join(", "));

    println!("\nFetcher:");
    println!("  Backend: {:?}", config.fetcher.backend);
    if config.fetcher.backend == FetcherBackend::Browser {
        println!("  Headless: {}", config.fetcher.headless);
        println!("  Language: {}", config.fetcher.language);
        println!(
            "  Ready selectors: {}",
            config.fetcher.ready_selectors.join(", ")
        );
    }

    println!("\nExtractor:");
    println!("  Model: {}", config.extractor.model);
    let key_set = std::env::var(&config.extractor.api_key_env)
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false);
    println!(
        "  API key ({}): {}",
        config.extractor.api_key_env,
        if key_set { "set" } else { "missing, heuristics only" }
    );
    println!(
        "  Detail URL pattern: {}",
        config.extractor.detail_url_pattern
    );

    println!("\nOutput:");
    println!(
        "  {}/{}_<timestamp>.csv",
        config.output.directory, config.output.file_prefix
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
///
/// Returns None if the run was interrupted with Ctrl-C.
async fn handle_harvest(config: &Config) -> anyhow::Result<Option<RunSummary>> {
    let extractor = build_extractor(&config.extractor, config.crawler.max_deep_links as usize);

    match config.fetcher.backend {
        FetcherBackend::Browser => {
            let session = BrowserSession::launch(&config.fetcher)
                .await
                .context("Failed to launch browser")?;

            let result = run_until_interrupted(config, &session, &extractor).await;

            // The session is released on every path, including Ctrl-C and errors
            session.shutdown().await;
            result
        }
        FetcherBackend::Http => {
            let client = build_http_client(&config.fetcher.user_agent)?;
            let fetcher = HttpFetcher::new(client)
                .with_settle_delay(Duration::from_millis(config.fetcher.settle_delay_ms));
            run_until_interrupted(config, &fetcher, &extractor).await
        }
    }
}

async fn run_until_interrupted(
    config: &Config,
    fetcher: &dyn PageFetcher,
    extractor: &dyn Extractor,
) -> anyhow::Result<Option<RunSummary>> {
    tokio::select! {
        result = harvest(config, fetcher, extractor) => {
            let summary = result.context("Harvest failed")?;
            Ok(Some(summary))
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping harvest");
            Ok(None)
        }
    }
}
