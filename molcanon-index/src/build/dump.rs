//! Raw mapping dump reader.
//!
//! Dumps are newline-delimited, tab-separated text, usually gzip-compressed.
//! Compression is detected from the gzip magic bytes rather than the file
//! extension, so uncompressed fixtures work the same way.

use crate::types::CompoundId;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Line counts from one pass over a dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpScan {
    pub lines: u64,
    /// Lines that were not valid UTF-8 and never reached the callback.
    pub invalid_utf8: u64,
}

/// Open a dump for line-oriented reading, transparently decompressing gzip.
pub fn open_dump(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let mut reader = BufReader::with_capacity(256 * 1024, File::open(path)?);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        Ok(Box::new(BufReader::with_capacity(
            256 * 1024,
            MultiGzDecoder::new(reader),
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// Stream every line of `reader` through `on_line`, without line terminators.
///
/// Reading stops after `limit` lines when a limit is given. Lines that are not
/// valid UTF-8 are counted and skipped.
pub fn scan_lines<R: BufRead>(
    mut reader: R,
    limit: Option<u64>,
    mut on_line: impl FnMut(&str),
) -> io::Result<DumpScan> {
    let mut scan = DumpScan::default();
    let mut buf = Vec::with_capacity(256);
    loop {
        if limit.is_some_and(|max| scan.lines >= max) {
            break;
        }
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        scan.lines += 1;
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        match std::str::from_utf8(&buf) {
            Ok(line) => on_line(line),
            Err(_) => scan.invalid_utf8 += 1,
        }
    }
    Ok(scan)
}

/// Parse a two-column `id<TAB>mapped-id` line. Extra columns are ignored.
pub fn parse_pair_line(line: &str) -> Option<(CompoundId, CompoundId)> {
    let mut cols = line.split('\t');
    let key = cols.next()?.parse().ok()?;
    let value = cols.next()?.parse().ok()?;
    Some((key, value))
}

/// Parse a three-column `id<TAB>identifier<TAB>structural-key` line.
///
/// The intermediate identifier column is ignored. An empty key is rejected.
pub fn parse_key_line(line: &str) -> Option<(CompoundId, &str)> {
    let mut cols = line.split('\t');
    let id = cols.next()?.parse().ok()?;
    let _identifier = cols.next()?;
    let key = cols.next()?.trim();
    if key.is_empty() {
        return None;
    }
    Some((id, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    #[test]
    fn pair_line_parsing() {
        assert_eq!(
            parse_pair_line("22247451\t962"),
            Some((CompoundId::new(22247451), CompoundId::new(962)))
        );
        assert_eq!(
            parse_pair_line("5\t6\tinformational"),
            Some((CompoundId::new(5), CompoundId::new(6)))
        );
        assert_eq!(parse_pair_line("5"), None);
        assert_eq!(parse_pair_line("cid\tpreferred"), None);
        assert_eq!(parse_pair_line("5\t-6"), None);
        assert_eq!(parse_pair_line(""), None);
    }

    #[test]
    fn key_line_parsing() {
        assert_eq!(
            parse_key_line("962\tInChI=1S/H2O/h1H2\tXLYOFNOQVPJJNP-UHFFFAOYSA-N"),
            Some((CompoundId::new(962), "XLYOFNOQVPJJNP-UHFFFAOYSA-N"))
        );
        assert_eq!(parse_key_line("962\tInChI=1S/H2O/h1H2"), None);
        assert_eq!(parse_key_line("962\tInChI\t"), None);
        assert_eq!(parse_key_line("x\tInChI\tKEY"), None);
    }

    #[test]
    fn scan_strips_terminators_and_counts_bad_utf8() {
        let data: &[u8] = b"1\t2\r\n\xff\xfe\n3\t4";
        let mut seen = Vec::new();
        let scan = scan_lines(Cursor::new(data), None, |l| seen.push(l.to_string())).unwrap();
        assert_eq!(scan.lines, 3);
        assert_eq!(scan.invalid_utf8, 1);
        assert_eq!(seen, vec!["1\t2", "3\t4"]);
    }

    #[test]
    fn scan_honours_line_limit() {
        let data: &[u8] = b"a\nb\nc\n";
        let mut seen = Vec::new();
        let scan = scan_lines(Cursor::new(data), Some(2), |l| seen.push(l.to_string())).unwrap();
        assert_eq!(scan.lines, 2);
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn open_dump_detects_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let gz_path = dir.path().join("dump.gz");
        let mut enc = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
        enc.write_all(b"1\t2\n").unwrap();
        enc.finish().unwrap();

        let plain_path = dir.path().join("dump.tsv");
        std::fs::write(&plain_path, b"1\t2\n").unwrap();

        for path in [&gz_path, &plain_path] {
            let mut lines = Vec::new();
            scan_lines(open_dump(path).unwrap(), None, |l| lines.push(l.to_string())).unwrap();
            assert_eq!(lines, vec!["1\t2"]);
        }
    }
}
