//! Read side: `lookup(id) -> Option<id>` against a pair index.
//!
//! Two strategies share the [`IndexLookup`] contract:
//!
//! - [`MemoryIndex`] loads the whole table once and binary searches in memory.
//! - [`DiskIndex`] keeps one file handle and binary searches by seek + read,
//!   never materializing the table.
//!
//! A key that is not present is `Ok(None)`; absence is the common case and the
//! caller falls back to identity. Both strategies search for the *first*
//! record with the key (lower bound), so a table with duplicate keys always
//! answers with its first record.
//!
//! Readers own their file handles; a `DiskIndex` is `Send` but not shareable
//! across threads without external locking because seek + read is not atomic.

pub mod disk;
pub mod key_string;
pub mod memory;

use crate::error::{IndexError, Result};
use crate::types::{CompoundId, ReadStrategy};
use disk::DiskIndex;
use memory::MemoryIndex;
use std::path::Path;
use tracing::{info, warn};

/// Point lookup against a sorted id → id table.
pub trait IndexLookup {
    /// Value stored for `key`, or `None` when the key is absent.
    fn lookup(&mut self, key: CompoundId) -> Result<Option<CompoundId>>;

    /// Number of records in the table.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An opened pair index, whichever strategy backs it.
#[derive(Debug)]
pub enum IndexReader {
    Memory(MemoryIndex),
    Disk(DiskIndex),
    /// Stand-in for a missing optional index: every lookup misses.
    Empty,
}

impl IndexReader {
    /// Open an index that must exist.
    pub fn open_required(path: &Path, strategy: ReadStrategy) -> Result<Self> {
        if !path.is_file() {
            return Err(IndexError::MissingIndexFile(path.to_path_buf()));
        }
        let reader = match strategy {
            ReadStrategy::InMemory => IndexReader::Memory(MemoryIndex::load(path)?),
            ReadStrategy::OnDisk => IndexReader::Disk(DiskIndex::open(path)?),
        };
        info!(
            path = %path.display(),
            strategy = ?strategy,
            records = reader.len(),
            "opened index"
        );
        Ok(reader)
    }

    /// Open an index that may be absent; a missing file maps nothing.
    pub fn open_optional(path: &Path, strategy: ReadStrategy) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "index file not found; lookups fall back to identity");
            return Ok(IndexReader::Empty);
        }
        Self::open_required(path, strategy)
    }
}

impl IndexLookup for IndexReader {
    fn lookup(&mut self, key: CompoundId) -> Result<Option<CompoundId>> {
        match self {
            IndexReader::Memory(index) => index.lookup(key),
            IndexReader::Disk(index) => index.lookup(key),
            IndexReader::Empty => Ok(None),
        }
    }

    fn len(&self) -> usize {
        match self {
            IndexReader::Memory(index) => index.len(),
            IndexReader::Disk(index) => index.len(),
            IndexReader::Empty => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::pair::{write_pair_index, PairRecord};

    #[test]
    fn optional_missing_index_maps_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader =
            IndexReader::open_optional(&dir.path().join("parent.idx"), ReadStrategy::OnDisk)
                .unwrap();
        assert!(matches!(reader, IndexReader::Empty));
        assert_eq!(reader.lookup(CompoundId::new(1)).unwrap(), None);
    }

    #[test]
    fn required_missing_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexReader::open_required(&dir.path().join("preferred.idx"), ReadStrategy::InMemory)
            .unwrap_err();
        assert!(matches!(err, IndexError::MissingIndexFile(_)));
    }

    #[test]
    fn both_strategies_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferred.idx");
        let records: Vec<PairRecord> = (0..200u32).map(|k| PairRecord::new(k * 3, k)).collect();
        let mut file = std::fs::File::create(&path).unwrap();
        write_pair_index(&mut file, &records).unwrap();
        drop(file);

        let mut mem = IndexReader::open_required(&path, ReadStrategy::InMemory).unwrap();
        let mut disk = IndexReader::open_required(&path, ReadStrategy::OnDisk).unwrap();
        assert_eq!(mem.len(), 200);
        assert_eq!(disk.len(), 200);
        for key in 0..620u32 {
            let key = CompoundId::new(key);
            assert_eq!(mem.lookup(key).unwrap(), disk.lookup(key).unwrap(), "key {key}");
        }
    }
}
