//! Key-string records: `key: u32 LE`, `len: u8`, then `len` raw UTF-8 bytes.
//!
//! ```text
//! count: u32
//! entries: [key: u32, len: u8, utf8_bytes: [u8; len]] x count
//! ```
//!
//! Entries are variable width, so the format is read sequentially.

use super::{decode_header, encode_header, header_count, HEADER_LEN};
use crate::types::CompoundId;
use std::io::{self, Write};

/// Longest string a single entry can carry.
pub const MAX_VALUE_LEN: usize = u8::MAX as usize;

/// One `(key, string)` entry of a key-string index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStringRecord {
    pub key: CompoundId,
    pub value: String,
}

impl KeyStringRecord {
    pub fn new(key: impl Into<CompoundId>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the value fits in the one-byte length prefix.
    pub fn is_encodable(&self) -> bool {
        self.value.len() <= MAX_VALUE_LEN
    }
}

/// Serialize `records` as a complete key-string index.
pub fn write_key_string_index<W: Write>(w: &mut W, records: &[KeyStringRecord]) -> io::Result<()> {
    w.write_all(&encode_header(header_count(records.len())?))?;
    for record in records {
        let bytes = record.value.as_bytes();
        let len = u8::try_from(bytes.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "key-string value too long for key {}: {} bytes",
                    record.key,
                    bytes.len()
                ),
            )
        })?;
        w.write_all(&record.key.to_le_bytes())?;
        w.write_all(&[len])?;
        w.write_all(bytes)?;
    }
    Ok(())
}

/// Parse a complete key-string index from a byte buffer.
pub fn read_key_string_index_from_bytes(data: &[u8]) -> io::Result<Vec<KeyStringRecord>> {
    let count = decode_header(data)?;
    // Smallest entry is 5 bytes; never trust the header beyond what the
    // buffer could hold.
    let max_entries = data.len().saturating_sub(HEADER_LEN) / 5;
    let mut records = Vec::with_capacity((count as usize).min(max_entries));
    let mut pos = HEADER_LEN;
    for _ in 0..count {
        if pos + 5 > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "key-string index truncated",
            ));
        }
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&data[pos..pos + 4]);
        let key = CompoundId::from_le_bytes(raw);
        let len = data[pos + 4] as usize;
        pos += 5;
        if pos + len > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "key-string index entry truncated",
            ));
        }
        let value = std::str::from_utf8(&data[pos..pos + len]).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("key-string index: invalid UTF-8: {}", e),
            )
        })?;
        records.push(KeyStringRecord {
            key,
            value: value.to_string(),
        });
        pos += len;
    }
    Ok(records)
}
