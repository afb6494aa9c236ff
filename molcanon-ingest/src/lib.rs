//! Streaming ingestion of compound records into a structure store.
//!
//! Each record carries a structural key, a candidate compound id and a 2D
//! structure. The [`IngestPipeline`] decides per record whether to store it,
//! replace the entry already stored under the same key, or skip it, and
//! writes decisions to a [`StructureStore`] in batches:
//!
//! ```text
//! source lines ─▶ RecordParser ─▶ decide ─▶ batch ─▶ StructureStore::batch_put
//!                                   │
//!                   CanonicalResolver + ConflictTracker
//!                                   │
//!                           MemoryWatchdog (clears both under pressure)
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod source;
pub mod stats;
pub mod store;
pub mod watchdog;

pub use config::IngestConfig;
pub use error::{IngestError, Result, StoreError};
pub use pipeline::{Decision, IngestPipeline, SkipReason};
pub use record::{
    Atom, Bond, JsonLinesParser, ParsedRecord, RecordError, RecordParser, StructurePayload,
};
pub use source::{open_source, SourceLines};
pub use stats::IngestStats;
pub use store::{MemoryStore, RedbStore, StoreWrite, StructureStore};
pub use watchdog::{MemoryProbe, MemoryWatchdog, SystemMemoryProbe};
