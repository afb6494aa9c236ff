//! `--config` file handling.
//!
//! ```toml
//! [ingest]
//! batch_size = 1000
//! max_memory_percent = 70.0
//! memory_check_interval = 500
//! cache_capacity = 10000
//! max_conflict_groups = 100000
//! read_strategy = "in_memory"
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use crate::error::{CliError, CliResult};
use molcanon_ingest::IngestConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub ingest: IngestConfig,
}

impl FileConfig {
    pub fn parse(text: &str) -> CliResult<Self> {
        toml::from_str(text).map_err(|e| CliError::Config(format!("invalid config file: {e}")))
    }
}

/// Load the ingest configuration, or defaults when no file is given.
pub fn load_ingest_config(path: Option<&Path>) -> CliResult<IngestConfig> {
    let Some(path) = path else {
        return Ok(IngestConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    Ok(FileConfig::parse(&text)?.ingest)
}
