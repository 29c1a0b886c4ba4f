//! Error types for the export pipeline

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for the export pipeline
///
/// Variants split into two families: fatal errors abort the remaining run
/// phases (the run still reaches finalization), while recoverable errors are
/// logged and the run continues. [`ExportError::is_recoverable`] tells the
/// two apart.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("result rows out of order: bib id {next} after {prev}")]
    UnorderedRows { prev: i64, next: i64 },

    #[error("no prior {0} run recorded in the ledger")]
    NoPriorRun(String),

    #[error("invalid cutoff date: {0}")]
    InvalidDate(String),

    #[error("cutoff {cutoff} is later than the run date {run_date}")]
    FutureCutoff {
        cutoff: NaiveDate,
        run_date: NaiveDate,
    },

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("ledger write failed: {0}")]
    LedgerWrite(String),
}

impl ExportError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transfer error
    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::Transfer(msg.into())
    }

    /// Create a ledger write error
    pub fn ledger_write(msg: impl Into<String>) -> Self {
        Self::LedgerWrite(msg.into())
    }

    /// Whether the run may continue after this error.
    ///
    /// Transfer and ledger-write failures are logged and carried; everything
    /// else aborts the remaining phases.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transfer(_) | Self::LedgerWrite(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_and_ledger_errors_are_recoverable() {
        assert!(ExportError::transfer("connection refused").is_recoverable());
        assert!(ExportError::ledger_write("disk full").is_recoverable());
    }

    #[test]
    fn test_fatal_errors_are_not_recoverable() {
        assert!(!ExportError::config("missing DATABASE_URL").is_recoverable());
        assert!(!ExportError::UnorderedRows { prev: 9, next: 7 }.is_recoverable());
        assert!(!ExportError::NoPriorRun("full".to_string()).is_recoverable());
        assert!(!ExportError::InvalidDate("2020-1-1".to_string()).is_recoverable());
        let io = ExportError::from(std::io::Error::other("boom"));
        assert!(!io.is_recoverable());
    }

    #[test]
    fn test_future_cutoff_message_names_both_dates() {
        let err = ExportError::FutureCutoff {
            cutoff: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            run_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2030-01-01"));
        assert!(msg.contains("2024-06-01"));
    }
}
