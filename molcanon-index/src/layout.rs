//! File layout of an index directory.

use std::path::{Path, PathBuf};

/// File name of the non-preferred → preferred index.
pub const PREFERRED_FILE: &str = "preferred.idx";
/// File name of the id → parent index.
pub const PARENT_FILE: &str = "parent.idx";
/// File name of the id → structural key index.
pub const STRUCTURAL_KEY_FILE: &str = "structural_keys.idx";

/// Paths of the index files inside one index directory.
#[derive(Debug, Clone)]
pub struct IndexLayout {
    dir: PathBuf,
}

impl IndexLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn preferred(&self) -> PathBuf {
        self.dir.join(PREFERRED_FILE)
    }

    pub fn parent(&self) -> PathBuf {
        self.dir.join(PARENT_FILE)
    }

    pub fn structural_keys(&self) -> PathBuf {
        self.dir.join(STRUCTURAL_KEY_FILE)
    }
}
