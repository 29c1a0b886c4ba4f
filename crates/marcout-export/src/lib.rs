//! Marcout Export Library
//!
//! Incremental extraction of catalog records from a library catalog's
//! backing store.
//!
//! Each run resolves a cutoff date from the run ledger (or exports
//! everything), streams bibliographic, holdings, authority and item rows out
//! of the catalog, routes every record to the right output file, and then
//! finalizes: the run is appended to the ledger, the artifacts are optionally
//! delivered over FTP, and a summary is posted to a webhook.
//!
//! # Example
//!
//! ```no_run
//! use marcout_export::config::ExportConfig;
//! use marcout_export::cutoff::RunMode;
//! use marcout_export::run::{ExportRun, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExportConfig::from_env()?;
//!     config.validate()?;
//!     let run_date = chrono::Utc::now().date_naive();
//!     let run = ExportRun::new(config, RunOptions::default(), RunMode::Full, run_date)?;
//!     run.execute().await?;
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod cutoff;
pub mod db;
pub mod items;
pub mod ledger;
pub mod notify;
pub mod outputs;
pub mod reference;
pub mod run;
pub mod session;
pub mod transfer;
