//! Record sources: newline-delimited files, optionally gzip-compressed.

use crate::error::{IngestError, Result};
use molcanon_index::build::dump::open_dump;
use std::io::{self, BufRead};
use std::path::Path;

/// Raw record lines of one source, without terminators.
///
/// Lines are yielded as bytes so a line that is not UTF-8 reaches the
/// pipeline as a malformed record instead of failing the whole source.
/// Blank lines are dropped here so they never count as records.
pub struct SourceLines {
    reader: Box<dyn BufRead>,
    buf: Vec<u8>,
}

impl Iterator for SourceLines {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                self.buf.pop();
            }
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(Ok(self.buf.clone()));
        }
    }
}

/// Open `path` and stream its lines. Gzip is detected from the file contents.
pub fn open_source(path: &Path) -> Result<SourceLines> {
    let reader = open_dump(path).map_err(|source| IngestError::Source {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SourceLines {
        reader,
        buf: Vec::with_capacity(1024),
    })
}
