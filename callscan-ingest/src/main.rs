//! callscan-ingest - Call recording indexer
//!
//! Scans a recordings folder (local or an already-mounted share), keeps the
//! recordings whose classification code matches, and builds a CSV report in
//! batches of parallel metadata extraction.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use callscan_ingest::config::{CliOverrides, IngestConfig};
use callscan_ingest::services::metadata_extractor::default_duration_probe;
use callscan_ingest::{RunOrchestrator, RunStatus};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for callscan-ingest
#[derive(Parser, Debug)]
#[command(name = "callscan-ingest")]
#[command(about = "Index call recordings into a CSV report")]
#[command(version)]
struct Args {
    /// Folder containing the recordings
    #[arg(short, long, env = "CALLSCAN_SOURCE")]
    source: Option<PathBuf>,

    /// Report file to create or merge into
    #[arg(short, long, env = "CALLSCAN_OUTPUT")]
    output: Option<PathBuf>,

    /// Classification code required at filename position 3
    #[arg(long, env = "CALLSCAN_CODE")]
    code: Option<String>,

    /// Files per batch
    #[arg(short, long, env = "CALLSCAN_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Worker threads per batch (default: available cores, at most 8)
    #[arg(short, long, env = "CALLSCAN_WORKERS")]
    workers: Option<usize>,

    /// Skip reading durations; every record gets "N/D"
    #[arg(long)]
    no_duration: bool,

    /// Config file (default: <config dir>/callscan/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let toml_config = callscan_common::config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("callscan_ingest={}", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting callscan-ingest {}", env!("CARGO_PKG_VERSION"));

    let cli = CliOverrides {
        source: args.source,
        output: args.output,
        target_code: args.code,
        batch_size: args.batch_size,
        workers: args.workers,
        no_duration: args.no_duration,
    };
    let config = IngestConfig::resolve(cli, &toml_config).context("Invalid configuration")?;

    let probe = if config.probe_durations {
        let probe = default_duration_probe();
        if probe.is_none() {
            warn!("Built without duration support, durations will be N/D");
        }
        probe
    } else {
        info!("Duration probing disabled, durations will be N/D");
        None
    };

    info!("Source folder: {}", config.source_dir.display());
    info!("Batch size: {} files", config.batch_size);
    info!("Output file: {}", config.output_path.display());
    info!("Filtering files with code '{}'", config.target_code);
    info!("Worker threads per batch: {}", config.workers);

    let orchestrator = RunOrchestrator::new(config, probe);
    let status = orchestrator.execute().await;

    match &status {
        RunStatus::Completed(summary) => info!(
            "Run finished: {} records in {:.1} minutes",
            summary.records_extracted,
            summary.elapsed.as_secs_f64() / 60.0
        ),
        RunStatus::NothingToDo => info!("Run finished: nothing to do"),
        RunStatus::Failed(e) => warn!("Run failed: {}", e),
    }

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
