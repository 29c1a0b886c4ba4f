//! Per-category output files
//!
//! One binary concatenation file per record category plus a delimited text
//! file for items, all created up front under the run's output directory.
//! Record blobs are written back to back with no separators; the files are
//! flushed at each phase boundary so a completed phase's artifact is whole
//! on disk before it is handed to the transfer side.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use marcout_common::Result;

#[derive(Debug)]
struct RecordFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RecordFile {
    fn create(path: PathBuf) -> Result<Self> {
        let writer = BufWriter::new(File::create(&path)?);
        Ok(Self { path, writer })
    }

    fn write_blob(&mut self, blob: &[u8]) -> Result<()> {
        self.writer.write_all(blob)?;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// The open output files of one run.
#[derive(Debug)]
pub struct OutputSet {
    bib: RecordFile,
    holdings: RecordFile,
    authority: RecordFile,
    malformed: RecordFile,
    items: RecordFile,
}

impl OutputSet {
    /// Create all output files under `dir`, named with the run's date stamp
    /// (`bib.20240601.mrc`, ..., `items.20240601.txt`). Creation failures
    /// surface before any row is read.
    pub fn create(dir: &Path, stamp: &str) -> Result<Self> {
        Ok(Self {
            bib: RecordFile::create(dir.join(format!("bib.{stamp}.mrc")))?,
            holdings: RecordFile::create(dir.join(format!("holdings.{stamp}.mrc")))?,
            authority: RecordFile::create(dir.join(format!("auth.{stamp}.mrc")))?,
            malformed: RecordFile::create(dir.join(format!("malformed.{stamp}.mrc")))?,
            items: RecordFile::create(dir.join(format!("items.{stamp}.txt")))?,
        })
    }

    pub fn write_bib(&mut self, blob: &[u8]) -> Result<()> {
        self.bib.write_blob(blob)
    }

    pub fn write_holdings(&mut self, blob: &[u8]) -> Result<()> {
        self.holdings.write_blob(blob)
    }

    pub fn write_authority(&mut self, blob: &[u8]) -> Result<()> {
        self.authority.write_blob(blob)
    }

    pub fn write_malformed(&mut self, blob: &[u8]) -> Result<()> {
        self.malformed.write_blob(blob)
    }

    pub fn write_item(&mut self, line: &str) -> Result<()> {
        self.items.write_line(line)
    }

    /// Flush everything to disk; called at phase boundaries.
    pub fn flush(&mut self) -> Result<()> {
        self.bib.flush()?;
        self.holdings.flush()?;
        self.authority.flush()?;
        self.malformed.flush()?;
        self.items.flush()?;
        Ok(())
    }

    /// Flush and close all files.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    pub fn bib_path(&self) -> &Path {
        &self.bib.path
    }

    pub fn holdings_path(&self) -> &Path {
        &self.holdings.path
    }

    pub fn authority_path(&self) -> &Path {
        &self.authority.path
    }

    pub fn malformed_path(&self) -> &Path {
        &self.malformed.path
    }

    pub fn items_path(&self) -> &Path {
        &self.items.path
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_are_created_up_front() {
        let dir = TempDir::new().unwrap();
        let outputs = OutputSet::create(dir.path(), "20240601").unwrap();

        assert!(outputs.bib_path().exists());
        assert!(outputs.holdings_path().exists());
        assert!(outputs.authority_path().exists());
        assert!(outputs.malformed_path().exists());
        assert!(outputs.items_path().exists());

        assert_eq!(
            outputs.bib_path().file_name().unwrap(),
            "bib.20240601.mrc"
        );
        assert_eq!(
            outputs.items_path().file_name().unwrap(),
            "items.20240601.txt"
        );
    }

    #[test]
    fn test_blobs_concatenate_without_separators() {
        let dir = TempDir::new().unwrap();
        let mut outputs = OutputSet::create(dir.path(), "20240601").unwrap();

        outputs.write_bib(b"00024nam first").unwrap();
        outputs.write_bib(b"00031nam second").unwrap();
        let bib_path = outputs.bib_path().to_path_buf();
        outputs.close().unwrap();

        let content = std::fs::read(bib_path).unwrap();
        assert_eq!(content, b"00024nam first00031nam second");
    }

    #[test]
    fn test_item_lines_are_newline_terminated() {
        let dir = TempDir::new().unwrap();
        let mut outputs = OutputSet::create(dir.path(), "20240601").unwrap();

        outputs.write_item("1|2|3|a|b|c|d|e|f|g|h").unwrap();
        outputs.write_item("4|5|6|a|b|c|d|e|f|g|h").unwrap();
        let items_path = outputs.items_path().to_path_buf();
        outputs.close().unwrap();

        let content = std::fs::read_to_string(items_path).unwrap();
        assert_eq!(content, "1|2|3|a|b|c|d|e|f|g|h\n4|5|6|a|b|c|d|e|f|g|h\n");
    }

    #[test]
    fn test_unwritten_files_stay_empty() {
        let dir = TempDir::new().unwrap();
        let outputs = OutputSet::create(dir.path(), "20240601").unwrap();
        let malformed = outputs.malformed_path().to_path_buf();
        outputs.close().unwrap();

        assert_eq!(std::fs::metadata(malformed).unwrap().len(), 0);
    }
}
