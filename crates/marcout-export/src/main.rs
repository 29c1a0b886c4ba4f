//! Marcout - library catalog export tool

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use marcout_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use marcout_export::config::ExportConfig;
use marcout_export::cutoff::RunMode;
use marcout_export::run::{ExportRun, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "marcout")]
#[command(author, version, about = "Library catalog export tool")]
struct Cli {
    /// What to export: omit for a full export, "last-full" or
    /// "last-incremental" to take the cutoff from the ledger, or an
    /// explicit YYYY-MM-DD date
    #[arg(long, value_name = "WHEN")]
    since: Option<String>,

    /// Restrict bib, holdings and item rows to one library
    #[arg(long, value_name = "ID")]
    library: Option<i64>,

    /// Skip the authority phase
    #[arg(long)]
    skip_authority: bool,

    /// Skip the item phase
    #[arg(long)]
    skip_items: bool,

    /// Hand finished files to the configured FTP destination
    #[arg(long)]
    transfer: bool,

    /// Output directory (overrides EXPORT_OUTPUT_DIR)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Ledger file (overrides EXPORT_LEDGER_FILE)
    #[arg(long, value_name = "FILE")]
    ledger: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ExportConfig::from_env()?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(ledger) = cli.ledger {
        config.ledger_file = ledger;
    }
    config.validate()?;

    let run_date = Utc::now().date_naive();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // A set LOG_* variable overrides its field; the log file location stays
    // bound to the run, since finalization reads it back for the report and
    // the optional log transfer
    let mut log_config = LogConfig::builder()
        .level(log_level)
        .output(LogOutput::Both)
        .build()
        .with_env_overrides()?;
    log_config.log_dir = config.log_dir.clone();
    log_config.log_file_name = ExportConfig::log_file_name(run_date);

    init_logging(&log_config)?;

    let mode = RunMode::from_cli(cli.since.as_deref());
    let options = RunOptions {
        library: cli.library,
        skip_authority: cli.skip_authority,
        skip_items: cli.skip_items,
        transfer: cli.transfer,
    };

    let run = ExportRun::new(config, options, mode, run_date)?;
    let report = run.execute().await?;

    info!(
        bib = report.counts.bib.good,
        holdings = report.counts.holdings.good,
        authority = report.counts.authority.good,
        items = report.counts.items,
        "export complete"
    );
    Ok(())
}
