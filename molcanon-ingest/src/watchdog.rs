//! Memory watchdog.
//!
//! Samples process memory through a [`MemoryProbe`] and reports when usage
//! crosses the configured threshold. The pipeline reacts by dropping its
//! lookup caches and conflict groups; queued and flushed decisions are never
//! touched.

use sysinfo::{MemoryRefreshKind, Pid, ProcessRefreshKind, System};
use tracing::{debug, warn};

/// Source of process memory usage.
pub trait MemoryProbe: Send {
    /// Resident memory of this process as a percentage of total RAM, or
    /// `None` when it cannot be determined.
    fn usage_percent(&mut self) -> Option<f64>;
}

/// [`MemoryProbe`] backed by `sysinfo`.
pub struct SystemMemoryProbe {
    system: System,
    pid: Option<Pid>,
    total_bytes: u64,
}

impl SystemMemoryProbe {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory_specifics(MemoryRefreshKind::everything());
        let total_bytes = system.total_memory();
        let pid = sysinfo::get_current_pid().ok();
        if total_bytes == 0 || pid.is_none() {
            warn!("could not detect process memory; memory watchdog disabled");
        }
        Self {
            system,
            pid,
            total_bytes,
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn usage_percent(&mut self) -> Option<f64> {
        let pid = self.pid?;
        if self.total_bytes == 0 {
            return None;
        }
        self.system
            .refresh_process_specifics(pid, ProcessRefreshKind::everything());
        let rss = self.system.process(pid)?.memory();
        Some(rss as f64 * 100.0 / self.total_bytes as f64)
    }
}

/// Threshold check over a [`MemoryProbe`].
pub struct MemoryWatchdog {
    probe: Box<dyn MemoryProbe>,
    threshold_percent: f64,
    checks: u64,
}

impl MemoryWatchdog {
    pub fn new(probe: Box<dyn MemoryProbe>, threshold_percent: f64) -> Self {
        Self {
            probe,
            threshold_percent,
            checks: 0,
        }
    }

    /// Sample once. Returns the usage when it exceeds the threshold.
    pub fn check(&mut self) -> Option<f64> {
        self.checks += 1;
        let usage = self.probe.usage_percent()?;
        debug!(usage_percent = usage, threshold = self.threshold_percent, "memory check");
        (usage > self.threshold_percent).then_some(usage)
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }
}
