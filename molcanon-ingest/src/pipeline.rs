//! The ingestion pipeline.
//!
//! Records are decided one at a time, in arrival order:
//!
//! ```text
//! Received ─▶ KeyExtracted ─┬─▶ Skipped
//!                           └─▶ ConflictChecked ─▶ Decided{Store|Replace|Skip}
//!                                                        │
//!                                               Queued ─▶ Flushed
//! ```
//!
//! - No entry for the key (in the store or the unflushed batch): **store**.
//! - Otherwise the candidate joins the key's conflict group; if the group's
//!   representative has the same canonical id as the candidate, the
//!   candidate **replaces** the stored entry, else it is **skipped**.
//!
//! Decisions are queued and written with one `batch_put` whenever the batch
//! reaches `batch_size`, at the end of each unit (source file), and when an
//! interrupt is observed. A process killed without reaching one of those
//! points loses at most one batch.

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::record::{JsonLinesParser, ParsedRecord, RecordParser, StructurePayload};
use crate::source::open_source;
use crate::stats::IngestStats;
use crate::store::{StoreWrite, StructureStore};
use crate::watchdog::{MemoryProbe, MemoryWatchdog, SystemMemoryProbe};
use molcanon_index::{IndexLayout, IndexLookup, IndexReader};
use molcanon_resolve::{CanonicalResolver, Canonicalize, ConflictTracker};
use rustc_hash::FxHashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Store,
    Replace,
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Unparseable record or invalid structure.
    Malformed,
    /// No structural key could be derived.
    MissingKey,
    /// The key already has an entry and the candidate is not its
    /// canonical representative.
    NotCanonical,
}

pub struct IngestPipeline<S, R = IndexReader> {
    config: IngestConfig,
    resolver: CanonicalResolver<R>,
    conflicts: ConflictTracker,
    store: S,
    parser: Box<dyn RecordParser>,
    watchdog: MemoryWatchdog,
    batch: Vec<StoreWrite>,
    pending: FxHashSet<String>,
    interrupt: Option<Arc<AtomicBool>>,
    stats: IngestStats,
}

impl<S: StructureStore> IngestPipeline<S, IndexReader> {
    /// Open the resolver indexes under `layout` and build a pipeline over
    /// `store`.
    pub fn open(config: IngestConfig, layout: &IndexLayout, store: S) -> Result<Self> {
        config.validate()?;
        let resolver = CanonicalResolver::open(layout, &config.resolver)?;
        Self::new(config, resolver, store)
    }
}

impl<S: StructureStore, R: IndexLookup> IngestPipeline<S, R> {
    pub fn new(config: IngestConfig, resolver: CanonicalResolver<R>, store: S) -> Result<Self> {
        config.validate()?;
        let watchdog = MemoryWatchdog::new(
            Box::new(SystemMemoryProbe::new()),
            config.max_memory_percent,
        );
        Ok(Self {
            conflicts: ConflictTracker::new(config.resolver.max_conflict_groups),
            batch: Vec::with_capacity(config.batch_size),
            config,
            resolver,
            store,
            parser: Box::new(JsonLinesParser),
            watchdog,
            pending: FxHashSet::default(),
            interrupt: None,
            stats: IngestStats::default(),
        })
    }

    pub fn with_parser(mut self, parser: Box<dyn RecordParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_memory_probe(mut self, probe: Box<dyn MemoryProbe>) -> Self {
        self.watchdog = MemoryWatchdog::new(probe, self.config.max_memory_percent);
        self
    }

    /// Stop at the next record once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &CanonicalResolver<R> {
        &self.resolver
    }

    pub fn conflicts(&self) -> &ConflictTracker {
        &self.conflicts
    }

    /// Decisions queued but not yet written.
    pub fn pending_len(&self) -> usize {
        self.batch.len()
    }

    pub fn into_parts(self) -> (IngestStats, S) {
        (self.stats, self.store)
    }

    /// Ingest every source in order, one unit per file.
    pub fn run(&mut self, sources: &[PathBuf]) -> Result<IngestStats> {
        let start = Instant::now();
        for path in sources {
            let lines = open_source(path)?;
            if !self.run_unit(path, lines)? {
                break;
            }
        }
        info!(
            processed = self.stats.processed,
            stored = self.stats.stored,
            replaced = self.stats.replaced,
            skipped = self.stats.skipped,
            batches = self.stats.batches_flushed,
            interrupted = self.stats.interrupted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ingestion finished"
        );
        Ok(self.stats)
    }

    /// Ingest one unit of raw record lines.
    ///
    /// Returns `false` when the run was interrupted; the pending batch has
    /// been flushed either way. A read error flushes the batch before it is
    /// returned.
    pub fn run_unit<I, L>(&mut self, unit: &Path, lines: I) -> Result<bool>
    where
        I: IntoIterator<Item = io::Result<L>>,
        L: AsRef<[u8]>,
    {
        info!(unit = %unit.display(), "ingesting unit");
        for line in lines {
            if self.interrupted() {
                self.stop()?;
                return Ok(false);
            }
            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    self.flush()?;
                    return Err(IngestError::Source {
                        path: unit.to_path_buf(),
                        source,
                    });
                }
            };
            self.process_bytes(line.as_ref())?;
        }
        self.end_unit()?;
        if self.interrupted() {
            self.mark_interrupted();
            return Ok(false);
        }
        Ok(true)
    }

    /// Decide one raw record line. Invalid UTF-8 is a malformed record.
    pub fn process_bytes(&mut self, raw: &[u8]) -> Result<Decision> {
        match std::str::from_utf8(raw) {
            Ok(line) => self.process_line(line),
            Err(err) => {
                debug!(error = %err, "record is not valid UTF-8");
                let decision = Decision::Skip(SkipReason::Malformed);
                self.account(decision)?;
                Ok(decision)
            }
        }
    }

    /// Parse and decide one raw record.
    pub fn process_line(&mut self, raw: &str) -> Result<Decision> {
        let decision = match self.parser.parse(raw) {
            Ok(record) => self.decide(record)?,
            Err(err) => {
                debug!(error = %err, "malformed record");
                Decision::Skip(SkipReason::Malformed)
            }
        };
        self.account(decision)?;
        Ok(decision)
    }

    /// Decide one already-parsed record.
    pub fn process(&mut self, record: ParsedRecord) -> Result<Decision> {
        let decision = self.decide(record)?;
        self.account(decision)?;
        Ok(decision)
    }

    /// Write the pending batch. Returns the number of entries written.
    ///
    /// On failure the batch is kept and the error is returned; the caller is
    /// expected to stop.
    pub fn flush(&mut self) -> Result<u64> {
        if self.batch.is_empty() {
            return Ok(0);
        }
        let written = self.store.batch_put(&self.batch)?;
        self.stats.batches_flushed += 1;
        self.stats.entries_written += written;
        debug!(entries = self.batch.len(), written, "flushed batch");
        self.batch.clear();
        self.pending.clear();
        Ok(written)
    }

    /// Close the current unit: flush and forget its conflict history.
    pub fn end_unit(&mut self) -> Result<()> {
        self.flush()?;
        self.conflicts.clear();
        self.stats.units_completed += 1;
        info!(
            units = self.stats.units_completed,
            processed = self.stats.processed,
            "unit complete"
        );
        Ok(())
    }

    /// Sample memory now and shed cached state if over the threshold.
    pub fn check_memory(&mut self) -> bool {
        let Some(usage) = self.watchdog.check() else {
            return false;
        };
        warn!(
            usage_percent = format!("{usage:.1}"),
            threshold = self.config.max_memory_percent,
            cached_groups = self.conflicts.len(),
            "memory pressure; clearing lookup caches and conflict groups"
        );
        self.resolver.clear_caches();
        self.conflicts.clear();
        self.stats.memory_warnings += 1;
        true
    }

    fn decide(&mut self, record: ParsedRecord) -> Result<Decision> {
        let Some(key) = record.key().map(str::to_owned) else {
            debug!(candidate = %record.candidate_id, "record has no structural key");
            return Ok(Decision::Skip(SkipReason::MissingKey));
        };
        let payload = match StructurePayload::from_record(&record).and_then(|p| p.to_bytes()) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(key, error = %err, "payload extraction failed");
                return Ok(Decision::Skip(SkipReason::Malformed));
            }
        };
        let candidate = record.candidate_id;

        if !self.exists(&key)? {
            self.queue(StoreWrite::store(key, payload));
            return Ok(Decision::Store);
        }

        self.conflicts.register(&key, candidate);
        let candidate_canonical = self.resolver.canonical(candidate)?;
        if candidate_canonical != candidate {
            self.stats.remappings += 1;
        }
        if self.conflicts.group(&key).is_some_and(|g| g.len() > 1) {
            self.stats.conflicts_resolved += 1;
        }
        let resolved = self.conflicts.resolve(&key, &mut self.resolver)?;
        let resolved_canonical = match resolved {
            Some(id) => Some(self.resolver.canonical(id)?),
            None => None,
        };

        if resolved_canonical == Some(candidate_canonical) {
            debug!(key, %candidate, canonical = %candidate_canonical, "replacing stored entry");
            self.queue(StoreWrite::replace(key, payload));
            Ok(Decision::Replace)
        } else {
            debug!(key, %candidate, resolved = ?resolved, "keeping stored entry");
            Ok(Decision::Skip(SkipReason::NotCanonical))
        }
    }

    fn exists(&self, key: &str) -> Result<bool> {
        if self.pending.contains(key) {
            return Ok(true);
        }
        Ok(self.store.contains(key)?)
    }

    fn queue(&mut self, write: StoreWrite) {
        self.pending.insert(write.key.clone());
        self.batch.push(write);
    }

    fn account(&mut self, decision: Decision) -> Result<()> {
        self.stats.processed += 1;
        match decision {
            Decision::Store => self.stats.stored += 1,
            Decision::Replace => self.stats.replaced += 1,
            Decision::Skip(reason) => {
                self.stats.skipped += 1;
                if matches!(reason, SkipReason::Malformed | SkipReason::MissingKey) {
                    self.stats.malformed += 1;
                }
            }
        }
        if self.batch.len() >= self.config.batch_size {
            self.flush()?;
        }
        if self.stats.processed % self.config.memory_check_interval == 0 {
            self.check_memory();
        }
        Ok(())
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn stop(&mut self) -> Result<()> {
        self.flush()?;
        self.mark_interrupted();
        Ok(())
    }

    fn mark_interrupted(&mut self) {
        self.stats.interrupted = true;
        warn!(processed = self.stats.processed, "interrupted; stopping");
    }
}
