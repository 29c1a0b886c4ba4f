//! FTP delivery of finished output files
//!
//! The FTP client is synchronous, so each upload runs inside
//! `spawn_blocking`. Transfer failures are recoverable: the run keeps its
//! outputs on disk and reports the failure instead of aborting.

use std::fs::File;
use std::path::Path;

use suppaftp::types::{FileType, FormatControl};
use suppaftp::{FtpStream, Mode};
use tracing::{debug, info, warn};

use marcout_common::{ExportError, Result};

/// How a file travels over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Binary,
    Text,
}

impl TransferMode {
    fn file_type(&self) -> FileType {
        match self {
            TransferMode::Binary => FileType::Binary,
            TransferMode::Text => FileType::Ascii(FormatControl::Default),
        }
    }
}

/// Connection settings for the remote drop directory.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub remote_dir: String,
}

/// Uploads output files to the configured FTP server.
#[derive(Debug, Clone)]
pub struct Transferrer {
    config: TransferConfig,
}

impl Transferrer {
    pub fn new(config: TransferConfig) -> Self {
        Self { config }
    }

    /// Upload one file, skipping it when it is empty.
    pub async fn send_if_nonempty(&self, path: &Path, mode: TransferMode) -> Result<()> {
        if is_empty_file(path)? {
            debug!(path = %path.display(), "skipping empty file");
            return Ok(());
        }
        self.send(path, mode).await
    }

    /// Upload one file as a single attempt. Each call opens a fresh
    /// connection and closes it afterwards.
    pub async fn send(&self, path: &Path, mode: TransferMode) -> Result<()> {
        let config = self.config.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || send_sync(&config, &path, mode))
            .await
            .map_err(|e| ExportError::transfer(format!("transfer task failed: {e}")))?
    }
}

fn send_sync(config: &TransferConfig, path: &Path, mode: TransferMode) -> Result<()> {
    let name = remote_name(path)?;
    debug!(host = %config.host, file = %name, "connecting to FTP server");

    let mut ftp = FtpStream::connect(format!("{}:{}", config.host, config.port))
        .map_err(|e| ExportError::transfer(format!("connect to {}: {e}", config.host)))?;
    ftp.set_mode(Mode::ExtendedPassive);
    ftp.login(&config.username, &config.password)
        .map_err(|e| ExportError::transfer(format!("login as {}: {e}", config.username)))?;
    ftp.transfer_type(mode.file_type())
        .map_err(|e| ExportError::transfer(format!("set transfer type: {e}")))?;
    if !config.remote_dir.is_empty() {
        ftp.cwd(&config.remote_dir)
            .map_err(|e| ExportError::transfer(format!("cwd to {}: {e}", config.remote_dir)))?;
    }

    let mut file = File::open(path)
        .map_err(|e| ExportError::transfer(format!("open {}: {e}", path.display())))?;
    ftp.put_file(&name, &mut file)
        .map_err(|e| ExportError::transfer(format!("upload {name}: {e}")))?;

    if let Err(e) = ftp.quit() {
        warn!(error = %e, "FTP quit failed after upload");
    }
    info!(file = %name, "uploaded");
    Ok(())
}

fn remote_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ExportError::transfer(format!("no file name in {}", path.display())))
}

fn is_empty_file(path: &Path) -> Result<bool> {
    let meta = std::fs::metadata(path)
        .map_err(|e| ExportError::transfer(format!("stat {}: {e}", path.display())))?;
    Ok(meta.len() == 0)
}
