//! Error types for index building and lookup.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    /// A required index file is absent from the index directory.
    #[error("index file not found: {}", .0.display())]
    MissingIndexFile(PathBuf),

    /// A required raw dump was not supplied or does not exist.
    #[error("input dump not found: {}", .0.display())]
    MissingInput(PathBuf),
}

pub type Result<T> = std::result::Result<T, IndexError>;
