//! Fixed-stride pair records: `key: u32 LE` followed by `value: u32 LE`.
//!
//! ```text
//! count: u32
//! records: [key: u32, value: u32] x count   (ascending by key)
//! ```
//!
//! The fixed stride lets a reader jump to record `i` at byte offset
//! `HEADER_LEN + i * RECORD_LEN` without decoding anything in between.

use super::{decode_header, encode_header, header_count, HEADER_LEN};
use crate::types::CompoundId;
use std::io::{self, Write};

/// Size of one pair record in bytes.
pub const RECORD_LEN: usize = 8;

/// One `(key, value)` entry of a pair index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairRecord {
    pub key: CompoundId,
    pub value: CompoundId,
}

impl PairRecord {
    pub fn new(key: impl Into<CompoundId>, value: impl Into<CompoundId>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Write the record into the first 8 bytes of `buf`.
    #[inline]
    pub fn write_to(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= RECORD_LEN);
        buf[0..4].copy_from_slice(&self.key.to_le_bytes());
        buf[4..8].copy_from_slice(&self.value.to_le_bytes());
    }

    /// Read a record from the first 8 bytes of `buf`.
    #[inline]
    pub fn read_from(buf: &[u8; RECORD_LEN]) -> Self {
        let [k0, k1, k2, k3, v0, v1, v2, v3] = *buf;
        Self {
            key: CompoundId::from_le_bytes([k0, k1, k2, k3]),
            value: CompoundId::from_le_bytes([v0, v1, v2, v3]),
        }
    }
}

/// Byte offset of record `index` within a pair index file.
#[inline]
pub fn record_offset(index: u64) -> u64 {
    HEADER_LEN as u64 + index * RECORD_LEN as u64
}

/// Total file size of a pair index holding `count` records.
#[inline]
pub fn expected_file_len(count: u32) -> u64 {
    record_offset(count as u64)
}

/// Serialize `records` (already sorted by key) as a complete pair index.
pub fn write_pair_index<W: Write>(w: &mut W, records: &[PairRecord]) -> io::Result<()> {
    debug_assert!(
        records.windows(2).all(|p| p[0].key <= p[1].key),
        "pair records must be sorted by key"
    );
    w.write_all(&encode_header(header_count(records.len())?))?;
    let mut buf = [0u8; RECORD_LEN];
    for record in records {
        record.write_to(&mut buf);
        w.write_all(&buf)?;
    }
    Ok(())
}

/// Parse a complete pair index from a byte buffer.
pub fn read_pair_index_from_bytes(data: &[u8]) -> io::Result<Vec<PairRecord>> {
    let count = decode_header(data)?;
    let expected = expected_file_len(count);
    if (data.len() as u64) < expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "pair index truncated: {} < {} (count={})",
                data.len(),
                expected,
                count
            ),
        ));
    }

    let mut records = Vec::with_capacity(count as usize);
    for chunk in data[HEADER_LEN..expected as usize].chunks_exact(RECORD_LEN) {
        let mut raw = [0u8; RECORD_LEN];
        raw.copy_from_slice(chunk);
        records.push(PairRecord::read_from(&raw));
    }
    Ok(records)
}
