//! MAL scraper CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use mal_scraper::{resolve_ids, Checkpoint, MalClient, Orchestrator, OutputFormat, ResultSink};
use shared::{Config, LogConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape anime metadata from MyAnimeList", long_about = None)]
struct Args {
    /// MAL IDs to scrape (falls back to the config file when empty)
    mal_ids: Vec<u32>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: json or jsonl
    #[arg(short, long)]
    format: Option<String>,

    /// Maximum concurrent fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Checkpoint file to track progress across runs
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Don't resume from checkpoint, start fresh
    #[arg(long)]
    no_resume: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config = LogConfig::from_settings(&config.logging, "mal-scraper");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "MAL scraper starting");

    // Resolve identifiers (config IDs first, CLI IDs appended, deduplicated)
    let ids = resolve_ids(&config.mal_ids, &args.mal_ids)?;
    info!(ids = ids.len(), "Resolved MAL IDs");

    // Output path: CLI flag wins over config
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.path));

    // Format: explicit flag, then extension of a CLI-supplied path, then config
    let format: OutputFormat = match (&args.format, &args.output) {
        (Some(format), _) => format.parse()?,
        (None, Some(path)) => OutputFormat::from_path(path),
        (None, None) => config.output.format.parse()?,
    };

    let sink = ResultSink::create(&output_path, format)?;

    // Optional checkpoint
    let checkpoint_path = args
        .checkpoint
        .clone()
        .or_else(|| config.scraper.checkpoint.path.as_ref().map(PathBuf::from));
    let checkpoint = match checkpoint_path {
        Some(path) => Some(Checkpoint::load(
            path,
            !args.no_resume,
            config.scraper.checkpoint.save_interval,
        )?),
        None => None,
    };

    // Fetcher and orchestrator
    let client = MalClient::from_config(&config.scraper).context("Failed to create client")?;
    let concurrency = args.concurrency.unwrap_or(config.scraper.concurrency);
    let orchestrator = Orchestrator::new(Arc::new(client), concurrency);

    // Ctrl-C stops issuing new fetches; in-flight ones finish and flush
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, letting in-flight fetches finish");
            signal_token.cancel();
        }
    });

    info!(
        output = %output_path.display(),
        format = %format,
        concurrency = concurrency,
        "Starting scrape"
    );

    let stats = orchestrator
        .run(&ids, sink, checkpoint, shutdown)
        .await
        .context("Scrape run failed")?;

    info!("=== Scraping Complete ===");
    info!("Requested: {}", stats.requested);
    info!("Fetched: {}", stats.fetched);
    info!("Failed: {}", stats.failed);
    info!("Skipped (checkpoint): {}", stats.skipped);
    info!("Output written to {}", output_path.display());

    Ok(())
}
