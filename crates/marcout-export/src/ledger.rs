//! Append-only run history
//!
//! The ledger records one line per completed run, `date<TAB>kind`, and is
//! never rewritten. Cutoff resolution scans it backward for the most recent
//! entry of a kind; finalization appends exactly one new entry per run.
//! The file is plain text and operators do edit it by hand, so dates are
//! kept as raw strings here and validated at resolution time.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;

use marcout_common::{ExportError, Result};

/// The two families of export runs recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Full,
    Incremental,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Full => "full",
            RunKind::Incremental => "incremental",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(RunKind::Full),
            "incremental" => Some(RunKind::Incremental),
            _ => None,
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One prior run: the date it ran and what kind of run it was.
///
/// The date stays as the raw ledger text; strict validation happens when a
/// cutoff is resolved from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub date: String,
    pub kind: RunKind,
}

/// The run ledger: an append-only sequence of [`RunEntry`] values backed by
/// a tab-separated file.
#[derive(Debug)]
pub struct RunLedger {
    path: PathBuf,
    entries: Vec<RunEntry>,
}

impl RunLedger {
    /// A ledger handle without reading the file. Appends still work; use
    /// [`RunLedger::load`] when the history is needed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Load the run history from disk. A missing file is an empty history
    /// (the first run ever). Lines that do not parse are skipped with a
    /// warning; the resolver must keep working against a hand-edited file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut entries = Vec::new();

        if path.exists() {
            let file = File::open(&path)?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut fields = line.split('\t');
                let (date, kind) = match (fields.next(), fields.next()) {
                    (Some(date), Some(kind)) => (date, kind),
                    _ => {
                        warn!(line, "skipping ledger line with too few fields");
                        continue;
                    },
                };
                let Some(kind) = RunKind::parse(kind) else {
                    warn!(line, kind, "skipping ledger line with unknown run kind");
                    continue;
                };
                entries.push(RunEntry {
                    date: date.to_string(),
                    kind,
                });
            }
        }

        Ok(Self { path, entries })
    }

    /// Most recent entry of the given kind, scanning backward from the end.
    pub fn last_of_kind(&self, kind: RunKind) -> Option<&RunEntry> {
        self.entries.iter().rev().find(|e| e.kind == kind)
    }

    /// Append one entry for a completed run. The file is created if it does
    /// not exist yet. Failures come back as a recoverable
    /// [`ExportError::LedgerWrite`]: a run that exported its records but
    /// could not be recorded is an anomaly to log, not a failed run.
    pub fn append(&mut self, date: NaiveDate, kind: RunKind) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| {
                ExportError::ledger_write(format!("open {}: {}", self.path.display(), e))
            })?;
        let date = date.format("%Y-%m-%d").to_string();
        writeln!(file, "{}\t{}", date, kind)
            .map_err(|e| {
                ExportError::ledger_write(format!("write {}: {}", self.path.display(), e))
            })?;
        self.entries.push(RunEntry { date, kind });
        Ok(())
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
