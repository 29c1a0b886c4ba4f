//! Run configuration
//!
//! Everything a run needs from its environment: database URL, output and
//! log directories, the ledger file, and the optional FTP and webhook
//! destinations.

use std::path::PathBuf;

use chrono::NaiveDate;

use marcout_common::{ExportError, Result};

use crate::transfer::TransferConfig;

// ============================================================================
// Export Configuration Constants
// ============================================================================

/// Default directory for output files.
pub const DEFAULT_OUTPUT_DIR: &str = "./export";

/// Default directory for run logs.
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Default ledger file name, relative to the output directory.
pub const DEFAULT_LEDGER_FILE: &str = "export-history.tsv";

/// Default FTP control port.
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Connection URL of the catalog database
    pub database_url: String,

    /// Directory the output files are written to
    pub output_dir: PathBuf,

    /// Directory the run log is written to
    pub log_dir: PathBuf,

    /// Path of the run-history ledger
    pub ledger_file: PathBuf,

    /// Webhook URL the run report is posted to
    pub webhook_url: Option<String>,

    /// FTP destination for finished output files
    pub ftp: Option<TransferConfig>,
}

impl ExportConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ExportError::config("DATABASE_URL is not set"))?;

        let output_dir = PathBuf::from(
            std::env::var("EXPORT_OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()),
        );
        let log_dir = PathBuf::from(
            std::env::var("EXPORT_LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string()),
        );
        let ledger_file = std::env::var("EXPORT_LEDGER_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| output_dir.join(DEFAULT_LEDGER_FILE));

        let webhook_url = std::env::var("EXPORT_WEBHOOK_URL").ok();
        let ftp = ftp_from_env()?;

        Ok(Self {
            database_url,
            output_dir,
            log_dir,
            ledger_file,
            webhook_url,
            ftp,
        })
    }

    /// Create the directories the run writes into.
    pub fn validate(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            ExportError::config(format!(
                "cannot create output directory {}: {e}",
                self.output_dir.display()
            ))
        })?;
        std::fs::create_dir_all(&self.log_dir).map_err(|e| {
            ExportError::config(format!(
                "cannot create log directory {}: {e}",
                self.log_dir.display()
            ))
        })?;
        if let Some(parent) = self.ledger_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ExportError::config(format!(
                        "cannot create ledger directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Name of the run log for a given run date, e.g. `marcout.20200601.log`.
    pub fn log_file_name(run_date: NaiveDate) -> String {
        format!("marcout.{}.log", run_date.format("%Y%m%d"))
    }

    /// Full path of the run log for a given run date.
    pub fn log_file_path(&self, run_date: NaiveDate) -> PathBuf {
        self.log_dir.join(Self::log_file_name(run_date))
    }
}

/// Assemble the FTP destination when `EXPORT_FTP_HOST` is set; a host
/// without credentials is a configuration mistake, not a disabled
/// destination.
fn ftp_from_env() -> Result<Option<TransferConfig>> {
    let Ok(host) = std::env::var("EXPORT_FTP_HOST") else {
        return Ok(None);
    };

    let port = std::env::var("EXPORT_FTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FTP_PORT);
    let username = std::env::var("EXPORT_FTP_USER").map_err(|_| {
        ExportError::config("EXPORT_FTP_USER is required when EXPORT_FTP_HOST is set")
    })?;
    let password = std::env::var("EXPORT_FTP_PASSWORD").map_err(|_| {
        ExportError::config("EXPORT_FTP_PASSWORD is required when EXPORT_FTP_HOST is set")
    })?;
    let remote_dir = std::env::var("EXPORT_FTP_DIR").unwrap_or_default();

    Ok(Some(TransferConfig {
        host,
        port,
        username,
        password,
        remote_dir,
    }))
}
