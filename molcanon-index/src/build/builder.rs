//! Index builder: parse a dump, filter, sort, and write an index file.
//!
//! Duplicate keys in a dump are resolved **first-wins**: records are
//! stable-sorted by key and only the first occurrence (in dump order) of each
//! key is written. Later duplicates are counted in
//! [`BuildStats::duplicate_keys`].

use super::dump::{open_dump, parse_key_line, parse_pair_line, scan_lines};
use crate::error::{IndexError, Result};
use crate::format::key_string::{write_key_string_index, KeyStringRecord};
use crate::format::pair::{write_pair_index, PairRecord};
use crate::layout::IndexLayout;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Which two-column mapping a pair index holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingKind {
    /// Non-preferred id → preferred id.
    Preferred,
    /// Id → parent id. Identity pairs are never stored.
    Parent,
}

impl MappingKind {
    pub fn name(self) -> &'static str {
        match self {
            MappingKind::Preferred => "preferred",
            MappingKind::Parent => "parent",
        }
    }

    fn drops_identity(self) -> bool {
        matches!(self, MappingKind::Parent)
    }
}

/// Counters for one index build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub lines_read: u64,
    pub records_written: u64,
    pub skipped_malformed: u64,
    pub skipped_identity: u64,
    pub duplicate_keys: u64,
    pub bytes_written: u64,
}

/// Raw dump inputs for a full build.
#[derive(Debug, Clone)]
pub struct DumpPaths {
    pub preferred: PathBuf,
    pub parent: PathBuf,
    /// Optional id → structural key dump.
    pub structural_keys: Option<PathBuf>,
    /// Maximum number of structural-key dump lines to read.
    pub key_limit: Option<usize>,
}

/// Per-index results of [`build_all`].
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub preferred: BuildStats,
    pub parent: BuildStats,
    pub structural_keys: Option<BuildStats>,
}

/// Build every index described by `dumps` into the directory of `layout`.
///
/// The preferred and parent dumps are required; both are checked before any
/// work starts so a missing input fails fast.
pub fn build_all(dumps: &DumpPaths, layout: &IndexLayout) -> Result<BuildSummary> {
    for required in [&dumps.preferred, &dumps.parent] {
        if !required.is_file() {
            return Err(IndexError::MissingInput(required.clone()));
        }
    }
    fs::create_dir_all(layout.dir())?;

    let preferred = build_pair_index(&dumps.preferred, &layout.preferred(), MappingKind::Preferred)?;
    let parent = build_pair_index(&dumps.parent, &layout.parent(), MappingKind::Parent)?;
    let structural_keys = match &dumps.structural_keys {
        Some(path) => Some(build_key_string_index(
            path,
            &layout.structural_keys(),
            dumps.key_limit,
        )?),
        None => None,
    };

    Ok(BuildSummary {
        preferred,
        parent,
        structural_keys,
    })
}

/// Build a pair index from a two-column dump.
pub fn build_pair_index(dump: &Path, dest: &Path, kind: MappingKind) -> Result<BuildStats> {
    if !dump.is_file() {
        return Err(IndexError::MissingInput(dump.to_path_buf()));
    }
    let start = Instant::now();
    info!(index = kind.name(), dump = %dump.display(), "reading mapping dump");

    let mut stats = BuildStats::default();
    let mut records = Vec::new();
    let scan = scan_lines(open_dump(dump)?, None, |line| match parse_pair_line(line) {
        Some((key, value)) if kind.drops_identity() && key == value => {
            stats.skipped_identity += 1;
        }
        Some((key, value)) => records.push(PairRecord { key, value }),
        None => stats.skipped_malformed += 1,
    })?;
    stats.lines_read = scan.lines;
    stats.skipped_malformed += scan.invalid_utf8;

    stats.duplicate_keys = sort_first_wins(&mut records, |r| r.key);
    if stats.duplicate_keys > 0 {
        warn!(
            index = kind.name(),
            duplicates = stats.duplicate_keys,
            "dump contains duplicate keys; kept first occurrence"
        );
    }

    stats.records_written = records.len() as u64;
    stats.bytes_written = write_atomically(dest, |w| write_pair_index(w, &records))?;

    info!(
        index = kind.name(),
        records = stats.records_written,
        malformed = stats.skipped_malformed,
        identity = stats.skipped_identity,
        bytes = stats.bytes_written,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote {}",
        dest.display()
    );
    Ok(stats)
}

/// Build a key-string index from a three-column `id, identifier, key` dump.
///
/// `limit` caps the number of dump lines read.
pub fn build_key_string_index(dump: &Path, dest: &Path, limit: Option<usize>) -> Result<BuildStats> {
    if !dump.is_file() {
        return Err(IndexError::MissingInput(dump.to_path_buf()));
    }
    let start = Instant::now();
    info!(dump = %dump.display(), limit = ?limit, "reading structural key dump");

    let mut stats = BuildStats::default();
    let mut records = Vec::new();
    let scan = scan_lines(open_dump(dump)?, limit.map(|n| n as u64), |line| {
        collect_key_line(line, &mut records, &mut stats)
    })?;
    stats.lines_read = scan.lines;
    stats.skipped_malformed += scan.invalid_utf8;

    stats.duplicate_keys = sort_first_wins(&mut records, |r| r.key);
    stats.records_written = records.len() as u64;
    stats.bytes_written = write_atomically(dest, |w| write_key_string_index(w, &records))?;

    info!(
        records = stats.records_written,
        malformed = stats.skipped_malformed,
        duplicates = stats.duplicate_keys,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote {}",
        dest.display()
    );
    Ok(stats)
}

fn collect_key_line(line: &str, records: &mut Vec<KeyStringRecord>, stats: &mut BuildStats) {
    match parse_key_line(line) {
        Some((key, value)) => {
            let record = KeyStringRecord::new(key, value);
            if record.is_encodable() {
                records.push(record);
            } else {
                stats.skipped_malformed += 1;
            }
        }
        None => stats.skipped_malformed += 1,
    }
}

/// Stable-sort by key and drop every record after the first for each key.
/// Returns the number of records dropped.
pub(crate) fn sort_first_wins<T, K: Ord>(records: &mut Vec<T>, key: impl Fn(&T) -> K) -> u64 {
    let before = records.len();
    records.sort_by_key(|r| key(r));
    records.dedup_by(|later, earlier| key(later) == key(earlier));
    (before - records.len()) as u64
}

/// Write through a `.tmp` sibling and rename into place. Returns bytes written.
fn write_atomically(
    dest: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> io::Result<u64> {
    let tmp = dest.with_extension("idx.tmp");
    let mut w = BufWriter::with_capacity(256 * 1024, File::create(&tmp)?);
    write(&mut w)?;
    w.flush()?;
    let file = w.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, dest)?;
    Ok(fs::metadata(dest)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let mut records = vec![
            PairRecord::new(5, 50),
            PairRecord::new(1, 10),
            PairRecord::new(5, 51),
            PairRecord::new(3, 30),
            PairRecord::new(5, 52),
        ];
        let dropped = sort_first_wins(&mut records, |r| r.key);
        assert_eq!(dropped, 2);
        assert_eq!(
            records,
            vec![
                PairRecord::new(1, 10),
                PairRecord::new(3, 30),
                PairRecord::new(5, 50),
            ]
        );
    }

    #[test]
    fn missing_dump_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_pair_index(
            &dir.path().join("absent.gz"),
            &dir.path().join("out.idx"),
            MappingKind::Preferred,
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::MissingInput(_)));
        assert!(!dir.path().join("out.idx").exists());
    }
}
