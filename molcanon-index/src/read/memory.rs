//! In-memory pair index: columnar key/value arrays, binary searched.

use super::IndexLookup;
use crate::build::builder::sort_first_wins;
use crate::error::{IndexError, Result};
use crate::format::pair::{read_pair_index_from_bytes, PairRecord};
use crate::types::CompoundId;
use std::path::Path;

/// A pair index held entirely in memory. O(N) memory, O(log N) lookups, no
/// I/O after load.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    keys: Vec<CompoundId>,
    values: Vec<CompoundId>,
}

impl MemoryIndex {
    /// Load a pair index file.
    pub fn load(path: &Path) -> Result<Self> {
        let records = read_pair_index_from_bytes(&std::fs::read(path)?)?;
        if let Some(pos) = records.windows(2).position(|w| w[0].key > w[1].key) {
            return Err(IndexError::Decode(format!(
                "{}: records out of order at position {}",
                path.display(),
                pos + 1
            )));
        }
        Ok(Self::from_sorted(records))
    }

    /// Build from records in any order. Duplicate keys keep the first record.
    pub fn from_records(mut records: Vec<PairRecord>) -> Self {
        sort_first_wins(&mut records, |r| r.key);
        Self::from_sorted(records)
    }

    fn from_sorted(records: Vec<PairRecord>) -> Self {
        let (keys, values) = records.into_iter().map(|r| (r.key, r.value)).unzip();
        Self { keys, values }
    }

    /// Lookup without needing `&mut self`.
    #[inline]
    pub fn get(&self, key: CompoundId) -> Option<CompoundId> {
        let idx = self.keys.partition_point(|&k| k < key);
        match self.keys.get(idx) {
            Some(&found) if found == key => Some(self.values[idx]),
            _ => None,
        }
    }
}

impl IndexLookup for MemoryIndex {
    fn lookup(&mut self, key: CompoundId) -> Result<Option<CompoundId>> {
        Ok(self.get(key))
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}
