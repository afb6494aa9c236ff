//! Structure stores: where decided records end up.
//!
//! The pipeline depends only on [`StructureStore`]. Every `batch_put` is one
//! atomic write: either all of its entries are applied, in order, or none are.

use crate::error::StoreError;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const STRUCTURES: TableDefinition<&str, &[u8]> = TableDefinition::new("structures");

/// One queued write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreWrite {
    pub key: String,
    pub value: Vec<u8>,
    /// `false` leaves an existing entry untouched.
    pub overwrite: bool,
}

impl StoreWrite {
    pub fn store(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
            overwrite: false,
        }
    }

    pub fn replace(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
            overwrite: true,
        }
    }
}

/// Persistent key → payload storage.
pub trait StructureStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Apply `writes` atomically. Returns the number of entries written.
    fn batch_put(&mut self, writes: &[StoreWrite]) -> Result<u64, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;
}

/// Ordered in-memory store. Remembers the size of every batch it receives.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
    batch_sizes: Vec<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sizes of every `batch_put` call, in call order.
    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }

    pub fn entries(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.entries
    }
}

impl StructureStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn batch_put(&mut self, writes: &[StoreWrite]) -> Result<u64, StoreError> {
        self.batch_sizes.push(writes.len());
        let mut written = 0;
        for write in writes {
            if !write.overwrite && self.entries.contains_key(&write.key) {
                continue;
            }
            self.entries.insert(write.key.clone(), write.value.clone());
            written += 1;
        }
        Ok(written)
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.entries.len() as u64)
    }
}

/// File-backed store on redb. One write transaction per batch.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open `path`, creating the database and its table if needed.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        {
            txn.open_table(STRUCTURES)?;
        }
        txn.commit()?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("database not found: {}", path.display()),
            )));
        }
        Self::create(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Up to `n` entries, in key order.
    pub fn sample(&self, n: usize) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(STRUCTURES)?;
        let mut out = Vec::with_capacity(n.min(1024));
        for entry in table.iter()?.take(n) {
            let (key, value) = entry?;
            out.push((key.value().to_string(), value.value().to_vec()));
        }
        Ok(out)
    }
}

impl StructureStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(STRUCTURES)?;
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn batch_put(&mut self, writes: &[StoreWrite]) -> Result<u64, StoreError> {
        let txn = self.db.begin_write()?;
        let mut written = 0;
        {
            let mut table = txn.open_table(STRUCTURES)?;
            for write in writes {
                if !write.overwrite && table.get(write.key.as_str())?.is_some() {
                    continue;
                }
                table.insert(write.key.as_str(), write.value.as_slice())?;
                written += 1;
            }
        }
        txn.commit()?;
        debug!(entries = writes.len(), written, "committed batch");
        Ok(written)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(STRUCTURES)?;
        Ok(table.len()?)
    }
}
