//! On-disk pair index: binary search by fixed-stride seek + read.

use super::IndexLookup;
use crate::error::{IndexError, Result};
use crate::format::pair::{expected_file_len, record_offset, PairRecord, RECORD_LEN};
use crate::format::{decode_header, HEADER_LEN};
use crate::types::CompoundId;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A pair index consulted directly on disk. O(1) memory, O(log N) seeks per
/// lookup.
#[derive(Debug)]
pub struct DiskIndex {
    file: File,
    path: PathBuf,
    count: u32,
    record_reads: u64,
}

impl DiskIndex {
    /// Open `path`, validate its header against the file size, and keep the
    /// handle for subsequent lookups.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; HEADER_LEN];
        file.read_exact(&mut header).map_err(|e| {
            IndexError::Decode(format!("{}: cannot read header: {}", path.display(), e))
        })?;
        let count = decode_header(&header)?;

        let actual = file.metadata()?.len();
        let expected = expected_file_len(count);
        if actual < expected {
            return Err(IndexError::Decode(format!(
                "{}: truncated: {} < {} bytes (count={})",
                path.display(),
                actual,
                expected,
                count
            )));
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            count,
            record_reads: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total records read from disk since open.
    pub fn record_reads(&self) -> u64 {
        self.record_reads
    }

    fn read_record(&mut self, index: u32) -> io::Result<PairRecord> {
        self.file.seek(SeekFrom::Start(record_offset(index as u64)))?;
        let mut raw = [0u8; RECORD_LEN];
        self.file.read_exact(&mut raw)?;
        self.record_reads += 1;
        Ok(PairRecord::read_from(&raw))
    }
}

impl IndexLookup for DiskIndex {
    fn lookup(&mut self, key: CompoundId) -> Result<Option<CompoundId>> {
        // Lower bound: first record whose key is >= `key`. The last record
        // that moved `hi` down is exactly the record at the final `hi`.
        let (mut lo, mut hi) = (0u32, self.count);
        let mut candidate = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let record = self.read_record(mid)?;
            if record.key < key {
                lo = mid + 1;
            } else {
                hi = mid;
                candidate = Some(record);
            }
        }
        Ok(candidate.filter(|r| r.key == key).map(|r| r.value))
    }

    fn len(&self) -> usize {
        self.count as usize
    }
}
