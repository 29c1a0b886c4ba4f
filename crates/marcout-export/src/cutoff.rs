//! Cutoff date resolution
//!
//! Turns the run-mode selector into either no cutoff (full export) or a
//! validated cutoff date, reading the run ledger for the by-marker modes.
//! Resolution is read-only against the ledger; the write for this run
//! happens later, at finalization.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::info;

use marcout_common::{ExportError, Result};

use crate::ledger::{RunKind, RunLedger};

// chrono alone accepts single-digit components, so the shape is checked first
static DATE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

/// How the caller selected what to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Export everything; no cutoff, no ledger access.
    Full,
    /// Records changed since the most recent full run in the ledger.
    SinceLastFull,
    /// Records changed since the most recent incremental run in the ledger.
    SinceLastIncremental,
    /// Records changed since an explicit date, kept raw until resolution.
    Since(String),
}

impl RunMode {
    /// Map the CLI's `--since` value to a mode. An absent value means a full
    /// export; anything that is not a known marker is treated as an explicit
    /// date and validated at resolution time.
    pub fn from_cli(since: Option<&str>) -> Self {
        match since {
            None => RunMode::Full,
            Some("last-full") => RunMode::SinceLastFull,
            Some("last-incremental") => RunMode::SinceLastIncremental,
            Some(other) => RunMode::Since(other.to_string()),
        }
    }

    /// The kind this run will be recorded as in the ledger. Known before
    /// resolution so a run that fails while resolving still records its kind.
    pub fn kind(&self) -> RunKind {
        match self {
            RunMode::Full => RunKind::Full,
            _ => RunKind::Incremental,
        }
    }
}

/// Resolve the effective cutoff for a run.
///
/// `None` means a full export. The by-marker modes scan the ledger backward
/// for the most recent matching entry; an explicit date must be strictly
/// `YYYY-MM-DD` and no later than `run_date`.
pub fn resolve_cutoff(
    mode: &RunMode,
    ledger: &RunLedger,
    run_date: NaiveDate,
) -> Result<Option<NaiveDate>> {
    match mode {
        RunMode::Full => Ok(None),
        RunMode::SinceLastFull => resolve_from_ledger(ledger, RunKind::Full),
        RunMode::SinceLastIncremental => resolve_from_ledger(ledger, RunKind::Incremental),
        RunMode::Since(raw) => {
            let cutoff = parse_cutoff_date(raw)?;
            if cutoff > run_date {
                return Err(ExportError::FutureCutoff { cutoff, run_date });
            }
            Ok(Some(cutoff))
        },
    }
}

fn resolve_from_ledger(ledger: &RunLedger, kind: RunKind) -> Result<Option<NaiveDate>> {
    let entry = ledger
        .last_of_kind(kind)
        .ok_or_else(|| ExportError::NoPriorRun(kind.as_str().to_string()))?;
    let cutoff = parse_cutoff_date(&entry.date)?;
    info!(kind = %kind, cutoff = %cutoff, "cutoff resolved from ledger");
    Ok(Some(cutoff))
}

/// Strict `YYYY-MM-DD` parse. The shape check and the calendar check are
/// separate so `2020-1-1` and `2020-02-30` both fail.
pub fn parse_cutoff_date(raw: &str) -> Result<NaiveDate> {
    if !DATE_FORMAT.is_match(raw) {
        return Err(ExportError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ExportError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_history() -> (NamedTempFile, RunLedger) {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2020-01-01\tfull").unwrap();
        writeln!(file, "2020-02-01\tincremental").unwrap();
        writeln!(file, "2020-03-01\tincremental").unwrap();
        file.flush().unwrap();
        let ledger = RunLedger::load(file.path()).unwrap();
        (file, ledger)
    }

    #[test]
    fn test_full_mode_has_no_cutoff() {
        let (_file, ledger) = ledger_with_history();
        let cutoff = resolve_cutoff(&RunMode::Full, &ledger, date(2020, 6, 1)).unwrap();
        assert_eq!(cutoff, None);
    }

    #[test]
    fn test_markers_pick_the_most_recent_matching_entry() {
        let (_file, ledger) = ledger_with_history();

        let cutoff =
            resolve_cutoff(&RunMode::SinceLastIncremental, &ledger, date(2020, 6, 1)).unwrap();
        assert_eq!(cutoff, Some(date(2020, 3, 1)));

        let cutoff = resolve_cutoff(&RunMode::SinceLastFull, &ledger, date(2020, 6, 1)).unwrap();
        assert_eq!(cutoff, Some(date(2020, 1, 1)));
    }

    #[test]
    fn test_empty_ledger_fails_marker_resolution() {
        let ledger = RunLedger::new("unused");
        let err =
            resolve_cutoff(&RunMode::SinceLastFull, &ledger, date(2020, 6, 1)).unwrap_err();
        assert!(matches!(err, ExportError::NoPriorRun(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_hand_edited_ledger_date_fails_resolution() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "03/01/2020\tincremental").unwrap();
        file.flush().unwrap();
        let ledger = RunLedger::load(file.path()).unwrap();

        let err = resolve_cutoff(&RunMode::SinceLastIncremental, &ledger, date(2020, 6, 1))
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidDate(_)));
    }

    #[test]
    fn test_explicit_date_is_taken_verbatim() {
        let ledger = RunLedger::new("unused");
        let mode = RunMode::Since("2020-04-15".to_string());
        let cutoff = resolve_cutoff(&mode, &ledger, date(2020, 6, 1)).unwrap();
        assert_eq!(cutoff, Some(date(2020, 4, 15)));
    }

    #[test]
    fn test_explicit_date_equal_to_run_date_is_accepted() {
        let ledger = RunLedger::new("unused");
        let mode = RunMode::Since("2020-06-01".to_string());
        let cutoff = resolve_cutoff(&mode, &ledger, date(2020, 6, 1)).unwrap();
        assert_eq!(cutoff, Some(date(2020, 6, 1)));
    }

    #[test]
    fn test_future_explicit_date_is_rejected() {
        let ledger = RunLedger::new("unused");
        let mode = RunMode::Since("2020-06-02".to_string());
        let err = resolve_cutoff(&mode, &ledger, date(2020, 6, 1)).unwrap_err();
        assert!(matches!(err, ExportError::FutureCutoff { .. }));
    }

    #[test]
    fn test_strict_date_shapes() {
        assert!(parse_cutoff_date("2020-01-01").is_ok());
        assert!(parse_cutoff_date("2020-1-1").is_err());
        assert!(parse_cutoff_date("20200101").is_err());
        assert!(parse_cutoff_date("2020-01-01 ").is_err());
        assert!(parse_cutoff_date("yesterday").is_err());
        // shape passes, calendar does not
        assert!(parse_cutoff_date("2020-02-30").is_err());
        assert!(parse_cutoff_date("2020-13-01").is_err());
    }

    #[test]
    fn test_mode_from_cli() {
        assert_eq!(RunMode::from_cli(None), RunMode::Full);
        assert_eq!(RunMode::from_cli(Some("last-full")), RunMode::SinceLastFull);
        assert_eq!(
            RunMode::from_cli(Some("last-incremental")),
            RunMode::SinceLastIncremental
        );
        assert_eq!(
            RunMode::from_cli(Some("2020-04-15")),
            RunMode::Since("2020-04-15".to_string())
        );
    }

    #[test]
    fn test_mode_kind_is_known_before_resolution() {
        assert_eq!(RunMode::Full.kind(), RunKind::Full);
        assert_eq!(RunMode::SinceLastFull.kind(), RunKind::Incremental);
        assert_eq!(RunMode::SinceLastIncremental.kind(), RunKind::Incremental);
        assert_eq!(
            RunMode::Since("not-even-a-date".to_string()).kind(),
            RunKind::Incremental
        );
    }
}
