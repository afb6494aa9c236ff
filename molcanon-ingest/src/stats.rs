//! Run statistics

use serde::Serialize;

/// Counters for one ingestion run.
///
/// `skipped` includes `malformed`. `processed == stored + replaced + skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub processed: u64,
    pub stored: u64,
    pub replaced: u64,
    pub skipped: u64,
    /// Records that could not be parsed, had no structural key, or had an
    /// invalid structure.
    pub malformed: u64,
    /// Resolutions over a group of two or more ids.
    pub conflicts_resolved: u64,
    /// Candidates whose canonical id differs from the candidate id.
    pub remappings: u64,
    pub memory_warnings: u64,
    pub batches_flushed: u64,
    pub entries_written: u64,
    pub units_completed: u64,
    pub interrupted: bool,
}
