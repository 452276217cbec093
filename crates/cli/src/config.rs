//! Runtime settings resolved from flags and environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cloudkitchen_observability::LogFormat;
use cloudkitchen_storage::FileKeyValueStore;

#[derive(Debug, Args)]
pub struct Settings {
    /// Directory holding the stored bills (defaults to the platform data dir).
    #[arg(long, global = true, env = "CLOUDKITCHEN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log output: pretty or json. Filter with RUST_LOG.
    #[arg(long, global = true, env = "CLOUDKITCHEN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,
}

impl Settings {
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileKeyValueStore::default_dir()
                .context("no platform data directory; pass --data-dir or set CLOUDKITCHEN_DATA_DIR"),
        }
    }
}
