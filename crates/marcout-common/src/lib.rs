//! Marcout Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the marcout workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all marcout workspace members:
//!
//! - **Error Handling**: The export error taxonomy and result alias
//! - **Logging**: Tracing initialization for console and per-run log files
//!
//! # Example
//!
//! ```no_run
//! use marcout_common::{ExportError, Result};
//!
//! fn read_history(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     Ok(content)
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{ExportError, Result};
