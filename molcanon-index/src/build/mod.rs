//! Write side: raw mapping dumps → sorted index files.

pub mod builder;
pub mod dump;
