//! Batch entry point.
//!
//! # Responsibility
//! - Parse CLI flags into core configuration.
//! - Load the input batch (file or embedded sample), run it, render reports.

mod render;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use multidb_core::{
    default_log_level, init_logging, load_batch_file, BatchConfig, BatchRunner, LoggingConfig,
    RecordBatch, DEFAULT_WORKER_COUNT,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Validate a batch of users, products and orders and insert the valid
/// records concurrently, one SQLite store per entity.
#[derive(Debug, Parser)]
#[command(name = "multidb", version)]
struct Cli {
    /// Directory holding users.db, products.db and orders.db.
    #[arg(long, env = "MULTIDB_DATA_DIR", default_value = multidb_core::config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// JSON batch file; runs the built-in sample batch when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Concurrent inserts per entity phase.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Absolute directory for rotated log files; file logging is off without it.
    #[arg(long, env = "MULTIDB_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let logging = LoggingConfig::new(cli.log_level.as_str(), log_dir).with_echo_warnings(true);
        init_logging(&logging).map_err(anyhow::Error::msg)?;
    }

    info!(
        "event=cli_start module=cli status=ok data_dir={} workers={} input={}",
        cli.data_dir.display(),
        cli.workers,
        cli.input
            .as_deref()
            .map_or_else(|| "sample".to_string(), |path| path.display().to_string())
    );

    let batch = match &cli.input {
        Some(path) => load_batch_file(path)
            .with_context(|| format!("failed to load batch `{}`", path.display()))?,
        None => RecordBatch::sample(),
    };

    let config = BatchConfig::new(&cli.data_dir).with_worker_count(cli.workers);
    let runner = BatchRunner::from_config(&config).with_context(|| {
        format!("failed to open stores under `{}`", config.data_dir.display())
    })?;
    let report = runner.run(&batch);

    match cli.format {
        OutputFormat::Text => print!("{}", render::render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
