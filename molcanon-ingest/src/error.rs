//! Error types for ingestion

use molcanon_index::IndexError;
use molcanon_resolve::ResolveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structure store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failure reported by the storage engine
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// I/O error
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),
}

macro_rules! backend_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(e: $ty) -> Self {
                    StoreError::Backend(e.to_string())
                }
            }
        )*
    };
}

backend_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Ingestion errors
///
/// Per-record problems never surface here; they are counted in
/// [`IngestStats`](crate::IngestStats). What remains is fatal for the run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Index open or lookup failure
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Batch write failed; the batch was not applied
    #[error("Storage write failed: {0}")]
    Storage(#[from] StoreError),

    /// Record source could not be read
    #[error("Cannot read source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ResolveError> for IngestError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Index(e) => IngestError::Index(e),
            ResolveError::InvalidConfig(msg) => IngestError::InvalidConfig(msg),
        }
    }
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
