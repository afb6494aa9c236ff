//! Index wire formats.
//!
//! Every index file starts with a `count: u32` little-endian header. The pair
//! format follows it with fixed 8-byte records; the key-string format follows
//! it with `(key: u32, len: u8, utf8[len])` entries.

pub mod key_string;
pub mod pair;

use std::io;

/// Size of the record-count header in bytes.
pub const HEADER_LEN: usize = 4;

/// Encode the record-count header.
pub fn encode_header(count: u32) -> [u8; HEADER_LEN] {
    count.to_le_bytes()
}

/// Decode the record-count header from the first four bytes of `buf`.
pub fn decode_header(buf: &[u8]) -> io::Result<u32> {
    if buf.len() < HEADER_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("index header too small: {} < {}", buf.len(), HEADER_LEN),
        ));
    }
    let mut raw = [0u8; HEADER_LEN];
    raw.copy_from_slice(&buf[..HEADER_LEN]);
    Ok(u32::from_le_bytes(raw))
}

/// Convert a record count to the on-disk header width.
pub(crate) fn header_count(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("too many records for a u32 header: {len}"),
        )
    })
}
