//! Canonical compound-id resolution.
//!
//! - [`LookupCache`]: fixed-capacity LRU memoization in front of an index.
//! - [`CanonicalResolver`]: `canonical(id) = parent(preferred(id))`, one pass,
//!   each step served by its own cached index reader.
//! - [`ConflictTracker`]: the ids seen per structural key in the current
//!   session, and the rule that picks one canonical representative among
//!   them.

pub mod cache;
pub mod canonical;
pub mod config;
pub mod conflict;
pub mod error;

pub use cache::{CacheStats, LookupCache};
pub use canonical::{CachedMapping, CanonicalResolver, Canonicalize, ResolverCacheStats};
pub use config::ResolverConfig;
pub use conflict::{resolve_group, ConflictTracker};
pub use error::{ResolveError, Result};
