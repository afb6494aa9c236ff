//! In-memory reader for the id → structural key index.

use crate::build::builder::sort_first_wins;
use crate::error::Result;
use crate::format::key_string::{read_key_string_index_from_bytes, KeyStringRecord};
use crate::types::CompoundId;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct KeyStringIndex {
    records: Vec<KeyStringRecord>,
}

impl KeyStringIndex {
    pub fn load(path: &Path) -> Result<Self> {
        let records = read_key_string_index_from_bytes(&std::fs::read(path)?)?;
        Ok(Self::from_records(records))
    }

    /// Load `path` if it exists.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn from_records(mut records: Vec<KeyStringRecord>) -> Self {
        sort_first_wins(&mut records, |r| r.key);
        Self { records }
    }

    pub fn lookup(&self, key: CompoundId) -> Option<&str> {
        let idx = self.records.partition_point(|r| r.key < key);
        self.records
            .get(idx)
            .filter(|r| r.key == key)
            .map(|r| r.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
