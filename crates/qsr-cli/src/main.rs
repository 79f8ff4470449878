//! qsr - bulk document reloader and reload-log harvester
//!
//! Runs two sequential phases against a shared worker pool: reload every
//! candidate document through the engine, then harvest the engine's reload
//! logs into the relational store.

mod discover;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use qsr_common::config::Config;
use qsr_common::logging::{init_logging, LogConfig, LogLevel};
use qsr_common::pool::WorkerPool;
use qsr_engine::ReloadOrchestrator;
use qsr_harvest::{harvest, MySqlLogStore};

#[derive(Parser, Debug)]
#[command(name = "qsr")]
#[command(author, version, about = "Bulk document reloader and reload-log harvester")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured concurrency limit
    #[arg(long)]
    concurrency: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Environment configuration first, then the verbose flag on top
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(limit) = cli.concurrency {
        config.concurrency = limit;
    }

    // One pool for the whole run, shared by both phases.
    let pool = WorkerPool::new(config.concurrency);

    run_reload_phase(&config, &pool).await;
    run_harvest_phase(&config, &pool).await?;

    Ok(())
}

/// Phase 1: reload every candidate document through the engine.
async fn run_reload_phase(config: &Config, pool: &WorkerPool) {
    let documents = match discover::find_documents(&config.apps_dir) {
        Ok(documents) => documents,
        Err(e) => {
            error!("Document discovery failed: {:#}", e);
            return;
        },
    };

    if documents.is_empty() {
        warn!("No documents found under {}", config.apps_dir.display());
        return;
    }

    let orchestrator = ReloadOrchestrator::new(&config.engine_url, config.request_timeout());
    match orchestrator.run_all(documents, pool).await {
        Ok(summary) => {
            for outcome in summary.outcomes.iter().filter(|o| !o.is_success()) {
                warn!("{} was not reloaded this run", outcome.document);
            }
        },
        Err(e) => {
            // The engine is unreachable for every document; stop here so the
            // operator sees the message before the window closes.
            error!("{}", e);
            wait_for_operator();
            std::process::exit(1);
        },
    }
}

/// Phase 2: harvest reload logs into the store.
async fn run_harvest_phase(config: &Config, pool: &WorkerPool) -> Result<()> {
    let log_files = discover::find_logs(&config.logs_dir)?;
    info!(
        "Found {} log files under {}",
        log_files.len(),
        config.logs_dir.display()
    );

    let store = MySqlLogStore::new(&config.database_url);
    let stats = harvest(&store, pool, log_files).await?;

    info!(
        "Harvest complete: {} rows inserted, {} files skipped, {} packs failed",
        stats.inserted_rows, stats.skipped_files, stats.failed_packs
    );

    Ok(())
}

/// Hold the console open until the operator acknowledges; the process is
/// often launched by double-click and the window would vanish otherwise.
fn wait_for_operator() {
    eprint!("Press Enter to close this window...");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
