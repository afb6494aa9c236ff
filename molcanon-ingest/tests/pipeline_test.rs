//! Pipeline behaviour over in-memory indexes and stores, plus one run over
//! real files.

use flate2::write::GzEncoder;
use flate2::Compression;
use molcanon_index::{build_all, DumpPaths, IndexLayout, MemoryIndex, PairRecord};
use molcanon_ingest::{
    Decision, IngestConfig, IngestError, IngestPipeline, JsonLinesParser, MemoryProbe,
    MemoryStore, ParsedRecord, RecordError, RecordParser, RedbStore, SkipReason, StoreError,
    StoreWrite, StructurePayload, StructureStore,
};
use molcanon_resolve::CanonicalResolver;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const WATER: &str = "XLYOFNOQVPJJNP-UHFFFAOYSA-N";

/// Probe that always reports the same usage.
struct FixedProbe(f64);

impl MemoryProbe for FixedProbe {
    fn usage_percent(&mut self) -> Option<f64> {
        Some(self.0)
    }
}

fn resolver(preferred: &[(u32, u32)]) -> CanonicalResolver<MemoryIndex> {
    let preferred =
        MemoryIndex::from_records(preferred.iter().map(|&(k, v)| PairRecord::new(k, v)).collect());
    CanonicalResolver::new(preferred, MemoryIndex::default(), 16)
}

fn pipeline(config: IngestConfig) -> IngestPipeline<MemoryStore, MemoryIndex> {
    IngestPipeline::new(config, resolver(&[(22247451, 962)]), MemoryStore::new())
        .unwrap()
        .with_memory_probe(Box::new(FixedProbe(1.0)))
}

fn water(id: u32) -> ParsedRecord {
    ParsedRecord::new(WATER, id).with_atom("O", 0.0, 0.0)
}

fn keyed(i: usize) -> ParsedRecord {
    ParsedRecord::new(format!("KEY-{i}"), i as u32).with_atom("C", i as f64, 0.0)
}

fn lines(records: &[ParsedRecord]) -> Vec<io::Result<String>> {
    records
        .iter()
        .map(|r| Ok(serde_json::to_string(r).unwrap()))
        .collect()
}

#[test]
fn full_batch_is_one_put() {
    let mut p = pipeline(IngestConfig::default().with_batch_size(3));
    for i in 0..3 {
        assert_eq!(p.process(keyed(i)).unwrap(), Decision::Store);
    }
    assert_eq!(p.store().batch_sizes(), &[3]);
    assert_eq!(p.pending_len(), 0);

    p.end_unit().unwrap();
    assert_eq!(p.store().batch_sizes(), &[3]);
    assert_eq!(p.stats().batches_flushed, 1);
}

#[test]
fn trailing_partial_batch_is_flushed_at_end() {
    let mut p = pipeline(IngestConfig::default().with_batch_size(3));
    let records: Vec<_> = (0..7).map(keyed).collect();
    assert!(p.run_unit(Path::new("unit"), lines(&records)).unwrap());

    assert_eq!(p.store().batch_sizes(), &[3, 3, 1]);
    let stats = p.stats();
    assert_eq!(stats.stored, 7);
    assert_eq!(stats.entries_written, 7);
    assert_eq!(stats.units_completed, 1);
    assert_eq!(p.store().count().unwrap(), 7);
}

#[test]
fn water_conflict_replaces_with_canonical_candidate() {
    let mut p = pipeline(IngestConfig::default());

    assert_eq!(p.process(water(22247451)).unwrap(), Decision::Store);
    // The first entry is still pending, but the key already counts as taken.
    assert_eq!(p.process(water(962)).unwrap(), Decision::Replace);
    let latest = ParsedRecord::new(WATER, 22247451u32).with_atom("O", 1.0, 1.0);
    assert_eq!(p.process(latest.clone()).unwrap(), Decision::Replace);

    p.end_unit().unwrap();
    assert_eq!(p.store().batch_sizes(), &[3]);
    let stored = p.store().get(WATER).unwrap().unwrap();
    assert_eq!(
        StructurePayload::from_bytes(&stored).unwrap(),
        StructurePayload::from_record(&latest).unwrap()
    );

    let stats = p.stats();
    assert_eq!((stats.stored, stats.replaced, stats.skipped), (1, 2, 0));
    assert_eq!(stats.remappings, 1);
    assert_eq!(stats.conflicts_resolved, 1);
}

#[test]
fn non_representative_candidate_is_skipped() {
    let mut p = pipeline(IngestConfig::default());
    assert_eq!(p.process(ParsedRecord::new("K", 500u32)).unwrap(), Decision::Store);
    assert_eq!(p.process(ParsedRecord::new("K", 500u32)).unwrap(), Decision::Replace);
    assert_eq!(
        p.process(ParsedRecord::new("K", 700u32)).unwrap(),
        Decision::Skip(SkipReason::NotCanonical)
    );
    assert_eq!(p.conflicts().group("K").map(|g| g.len()), Some(2));
}

#[test]
fn malformed_records_are_counted_and_skipped() {
    let mut p = pipeline(IngestConfig::default());
    let dangling = ParsedRecord::new("K2", 2u32).with_atom("C", 0.0, 0.0).with_bond(0, 5, 1);
    let mut input = vec![
        Ok("not json".to_string()),
        Ok(r#"{"candidate_id":5}"#.to_string()),
    ];
    input.extend(lines(&[dangling, keyed(1)]));
    p.run_unit(Path::new("unit"), input).unwrap();

    let stats = p.stats();
    assert_eq!(stats.processed, 4);
    assert_eq!(stats.malformed, 3);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.stored, 1);
    assert_eq!(p.store().count().unwrap(), 1);
}

#[test]
fn memory_pressure_clears_state_without_losing_correctness() {
    let config = IngestConfig::default().with_memory_check_interval(2);
    let mut p = IngestPipeline::new(config, resolver(&[(22247451, 962)]), MemoryStore::new())
        .unwrap()
        .with_memory_probe(Box::new(FixedProbe(95.0)));

    p.process(water(22247451)).unwrap();
    p.process(water(962)).unwrap();

    let caches = p.resolver().cache_stats();
    assert_eq!(caches.preferred.len, 0);
    assert_eq!(caches.parent.len, 0);
    assert!(p.conflicts().is_empty());
    assert_eq!(p.stats().memory_warnings, 1);
    // Queued decisions survive.
    assert_eq!(p.pending_len(), 2);

    // Conflict history is gone, but canonical ids are recomputed correctly.
    assert_eq!(p.process(water(22247451)).unwrap(), Decision::Replace);
    assert!(p.resolver().cache_stats().preferred.len > 0);
}

#[test]
fn interrupt_flushes_pending_batch_and_stops() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut p = pipeline(IngestConfig::default()).with_interrupt(flag.clone());

    let records: Vec<_> = (0..5).map(keyed).collect();
    let input = lines(&records).into_iter().enumerate().map(move |(i, line)| {
        if i == 2 {
            flag.store(true, Ordering::Relaxed);
        }
        line
    });

    assert!(!p.run_unit(Path::new("unit"), input).unwrap());
    let stats = p.stats();
    assert!(stats.interrupted);
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.units_completed, 0);
    assert_eq!(p.store().batch_sizes(), &[2]);
}

struct FailingStore;

impl StructureStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn batch_put(&mut self, _writes: &[StoreWrite]) -> Result<u64, StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

#[test]
fn storage_failure_halts_the_run() {
    let mut p = IngestPipeline::new(
        IngestConfig::default().with_batch_size(2),
        resolver(&[]),
        FailingStore,
    )
    .unwrap()
    .with_memory_probe(Box::new(FixedProbe(1.0)));

    assert_eq!(p.process(keyed(0)).unwrap(), Decision::Store);
    let err = p.process(keyed(1)).unwrap_err();
    assert!(matches!(err, IngestError::Storage(StoreError::Backend(_))));
    assert_eq!(p.pending_len(), 2);
}

#[test]
fn invalid_config_is_rejected() {
    let result = IngestPipeline::new(
        IngestConfig::default().with_batch_size(0),
        resolver(&[]),
        MemoryStore::new(),
    );
    assert!(matches!(result, Err(IngestError::InvalidConfig(_))));
}

fn write_jsonl(path: &Path, records: &[ParsedRecord], gzip: bool) {
    let mut body = String::new();
    for record in records {
        body.push_str(&serde_json::to_string(record).unwrap());
        body.push('\n');
    }
    if gzip {
        let mut enc = GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::fast());
        enc.write_all(body.as_bytes()).unwrap();
        enc.finish().unwrap();
    } else {
        std::fs::write(path, body).unwrap();
    }
}

#[test]
fn run_over_files_into_redb() {
    let tmp = tempfile::tempdir().unwrap();
    let pref = tmp.path().join("pref.txt");
    let parent = tmp.path().join("parent.txt");
    std::fs::write(&pref, "22247451\t962\n").unwrap();
    std::fs::write(&parent, "").unwrap();
    let layout = IndexLayout::new(tmp.path().join("idx"));
    build_all(
        &DumpPaths {
            preferred: pref,
            parent,
            structural_keys: None,
            key_limit: None,
        },
        &layout,
    )
    .unwrap();

    let first = tmp.path().join("part-1.jsonl.gz");
    let second = tmp.path().join("part-2.jsonl");
    write_jsonl(&first, &[water(22247451), keyed(1)], true);
    write_jsonl(&second, &[water(962), keyed(2)], false);

    let store = RedbStore::create(&tmp.path().join("db").join("structures.redb")).unwrap();
    let mut p = IngestPipeline::open(IngestConfig::default().with_batch_size(1), &layout, store)
        .unwrap()
        .with_memory_probe(Box::new(FixedProbe(1.0)));
    let stats = p.run(&[first, second]).unwrap();

    assert_eq!(stats.units_completed, 2);
    assert_eq!(stats.stored, 3);
    assert_eq!(stats.replaced, 1);
    assert_eq!(stats.entries_written, 4);
    assert!(p.conflicts().is_empty());

    let (_, store) = p.into_parts();
    assert_eq!(store.count().unwrap(), 3);
    assert!(store.get(WATER).unwrap().is_some());
}

#[test]
fn missing_source_fails() {
    let mut p = pipeline(IngestConfig::default());
    let err = p.run(&[Path::new("/nonexistent/records.jsonl").to_path_buf()]);
    assert!(matches!(err, Err(IngestError::Source { .. })));
}

#[test]
fn invalid_utf8_line_is_skipped_and_run_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("records.jsonl");
    let mut body = serde_json::to_vec(&keyed(1)).unwrap();
    body.extend_from_slice(b"\n\xff\xfe garbage\n");
    body.extend_from_slice(&serde_json::to_vec(&keyed(2)).unwrap());
    body.push(b'\n');
    std::fs::write(&path, body).unwrap();

    let mut p = pipeline(IngestConfig::default());
    let stats = p.run(&[path]).unwrap();

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.stored, 2);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.units_completed, 1);
    assert_eq!(p.store().count().unwrap(), 2);
}

#[test]
fn invalid_utf8_bytes_are_a_malformed_decision() {
    let mut p = pipeline(IngestConfig::default());
    assert_eq!(
        p.process_bytes(b"\xff\xfe").unwrap(),
        Decision::Skip(SkipReason::Malformed)
    );
    assert_eq!(p.stats().malformed, 1);
}

#[test]
fn read_error_flushes_pending_batch_before_failing() {
    let mut p = pipeline(IngestConfig::default());
    let mut input = lines(&[keyed(1)]);
    input.push(Err(io::Error::new(io::ErrorKind::Other, "device went away")));
    input.extend(lines(&[keyed(2)]));

    let err = p.run_unit(Path::new("unit"), input).unwrap_err();
    assert!(matches!(err, IngestError::Source { .. }));
    assert_eq!(p.store().batch_sizes(), &[1]);
    assert!(p.store().get("KEY-1").unwrap().is_some());
    assert!(p.store().get("KEY-2").unwrap().is_none());
}

/// Parses normally, then raises the interrupt flag.
struct InterruptingParser(Arc<AtomicBool>);

impl RecordParser for InterruptingParser {
    fn parse(&self, raw: &str) -> Result<ParsedRecord, RecordError> {
        let record = JsonLinesParser.parse(raw);
        self.0.store(true, Ordering::Relaxed);
        record
    }
}

#[test]
fn interrupt_during_last_record_stops_before_next_unit() {
    let tmp = tempfile::tempdir().unwrap();
    let first = tmp.path().join("part-1.jsonl");
    let empty = tmp.path().join("part-2.jsonl");
    write_jsonl(&first, &[keyed(1)], false);
    std::fs::write(&empty, "").unwrap();

    let flag = Arc::new(AtomicBool::new(false));
    let mut p = pipeline(IngestConfig::default())
        .with_parser(Box::new(InterruptingParser(flag.clone())))
        .with_interrupt(flag);
    let stats = p.run(&[first, empty]).unwrap();

    assert!(stats.interrupted);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.units_completed, 1);
    assert_eq!(p.store().batch_sizes(), &[1]);
}
