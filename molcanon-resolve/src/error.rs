//! Error types for resolution.

use molcanon_index::IndexError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// Index open or lookup failure.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
