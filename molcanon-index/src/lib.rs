//! Sorted binary lookup tables for compound-id canonicalization.
//!
//! This crate owns the on-disk index formats (fixed-stride pair records and
//! length-prefixed key strings), the write side that turns raw tab-separated
//! mapping dumps into index files, and the read side that answers
//! `lookup(id)` either from memory or by seeking directly on disk.

pub mod error;
pub mod types;

pub mod build;
pub mod format;
pub mod layout;
pub mod read;

pub use error::{IndexError, Result};
pub use types::{CompoundId, ReadStrategy};

// ── Write side ───────────────────────────────────────────────────────────────
pub use build::builder::{build_all, build_key_string_index, build_pair_index, MappingKind};
pub use build::builder::{BuildStats, BuildSummary, DumpPaths};

// ── Format ───────────────────────────────────────────────────────────────────
pub use format::key_string::KeyStringRecord;
pub use format::pair::PairRecord;

// ── Read side ────────────────────────────────────────────────────────────────
pub use layout::IndexLayout;
pub use read::disk::DiskIndex;
pub use read::key_string::KeyStringIndex;
pub use read::memory::MemoryIndex;
pub use read::{IndexLookup, IndexReader};
