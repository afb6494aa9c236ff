//! Core identifier types shared by every crate in the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one catalog entry.
///
/// Ids are stored as `u32` on disk, so the type is a transparent wrapper over
/// `u32`. Raw text is parsed into a `CompoundId` exactly once, where it enters
/// the system (dump lines, record files, command-line arguments).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CompoundId(u32);

impl CompoundId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}

impl From<u32> for CompoundId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when text is not a valid compound id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCompoundIdError(String);

impl fmt::Display for ParseCompoundIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid compound id: {:?}", self.0)
    }
}

impl std::error::Error for ParseCompoundIdError {}

impl FromStr for CompoundId {
    type Err = ParseCompoundIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ParseCompoundIdError(s.to_string()))
    }
}

/// How an index file is consulted at lookup time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStrategy {
    /// Load every record once; binary search in memory.
    InMemory,
    /// Keep one file handle open; binary search by seek + read.
    #[default]
    OnDisk,
}
