//! Ingestion configuration

use crate::error::{IngestError, Result};
use molcanon_resolve::ResolverConfig;
use serde::Deserialize;

/// Default number of queued decisions per storage write.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default process-memory threshold, as a percentage of total RAM.
pub const DEFAULT_MAX_MEMORY_PERCENT: f64 = 80.0;

/// Default number of processed records between memory checks.
pub const DEFAULT_MEMORY_CHECK_INTERVAL: u64 = 1_000;

/// Configuration for an ingestion run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Decisions accumulated before one `batch_put`.
    ///
    /// Also the upper bound on decisions lost if the process is killed
    /// without a chance to flush.
    /// Default: 500
    pub batch_size: usize,

    /// Process memory (percent of total RAM) above which caches and conflict
    /// groups are dropped.
    ///
    /// Default: 80.0
    pub max_memory_percent: f64,

    /// Processed records between memory samples.
    ///
    /// Default: 1,000
    pub memory_check_interval: u64,

    /// Lookup cache and conflict table settings.
    #[serde(flatten)]
    pub resolver: ResolverConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_memory_percent: DEFAULT_MAX_MEMORY_PERCENT,
            memory_check_interval: DEFAULT_MEMORY_CHECK_INTERVAL,
            resolver: ResolverConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Builder method to set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder method to set the memory threshold
    pub fn with_max_memory_percent(mut self, percent: f64) -> Self {
        self.max_memory_percent = percent;
        self
    }

    /// Builder method to set how often memory is sampled
    pub fn with_memory_check_interval(mut self, interval: u64) -> Self {
        self.memory_check_interval = interval;
        self
    }

    /// Builder method to replace the resolver settings
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(IngestError::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }
        if !(self.max_memory_percent > 0.0 && self.max_memory_percent <= 100.0) {
            return Err(IngestError::InvalidConfig(format!(
                "max_memory_percent must be in (0, 100], got {}",
                self.max_memory_percent
            )));
        }
        if self.memory_check_interval == 0 {
            return Err(IngestError::InvalidConfig(
                "memory_check_interval must be at least 1".into(),
            ));
        }
        self.resolver.validate()?;
        Ok(())
    }
}
