//! `canonical(id) = parent(preferred(id))`.
//!
//! Each step is one cached index lookup with identity fallback. The
//! composition is a single pass: if the parent of the preferred id has a
//! preferred mapping of its own, it is **not** followed. For a chain
//! `A -preferred-> B -parent-> C -preferred-> D`, `canonical(A) == C` while
//! `canonical(C) == D`, so `canonical` is not idempotent on such chains.

use crate::cache::{CacheStats, LookupCache};
use crate::config::ResolverConfig;
use crate::error::Result;
use molcanon_index::{CompoundId, IndexLayout, IndexLookup, IndexReader};
use serde::Serialize;
use tracing::debug;

/// Anything that can map an id to its canonical form.
pub trait Canonicalize {
    fn canonical(&mut self, id: CompoundId) -> Result<CompoundId>;
}

/// One index reader with an LRU cache in front of it.
///
/// The cache stores the *resolved* value (the id itself on a miss), so
/// repeated lookups of unmapped ids cost no I/O either.
pub struct CachedMapping<R> {
    name: &'static str,
    reader: R,
    cache: LookupCache<CompoundId, CompoundId>,
}

impl<R: IndexLookup> CachedMapping<R> {
    pub fn new(name: &'static str, reader: R, cache_capacity: usize) -> Self {
        Self {
            name,
            reader,
            cache: LookupCache::new(cache_capacity),
        }
    }

    /// Mapped id for `id`, or `id` itself when the index has no entry.
    pub fn resolve(&mut self, id: CompoundId) -> Result<CompoundId> {
        if let Some(hit) = self.cache.get(&id) {
            return Ok(hit);
        }
        let resolved = self.reader.lookup(id)?.unwrap_or(id);
        self.cache.put(id, resolved);
        Ok(resolved)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn index_len(&self) -> usize {
        self.reader.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Cache counters for both resolver caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverCacheStats {
    pub preferred: CacheStats,
    pub parent: CacheStats,
}

/// Preferred-then-parent resolution over two cached indexes.
pub struct CanonicalResolver<R = IndexReader> {
    preferred: CachedMapping<R>,
    parent: CachedMapping<R>,
}

impl CanonicalResolver<IndexReader> {
    /// Open the indexes of `layout`.
    ///
    /// The preferred index is required; a missing parent index maps nothing.
    pub fn open(layout: &IndexLayout, config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        let preferred = IndexReader::open_required(&layout.preferred(), config.read_strategy)?;
        let parent = IndexReader::open_optional(&layout.parent(), config.read_strategy)?;
        Ok(Self::new(preferred, parent, config.cache_capacity))
    }
}

impl<R: IndexLookup> CanonicalResolver<R> {
    pub fn new(preferred: R, parent: R, cache_capacity: usize) -> Self {
        Self {
            preferred: CachedMapping::new("preferred", preferred, cache_capacity),
            parent: CachedMapping::new("parent", parent, cache_capacity),
        }
    }

    /// Preferred form of `id` (identity when unmapped).
    pub fn preferred(&mut self, id: CompoundId) -> Result<CompoundId> {
        self.preferred.resolve(id)
    }

    /// Parent form of `id` (identity when unmapped).
    pub fn parent(&mut self, id: CompoundId) -> Result<CompoundId> {
        self.parent.resolve(id)
    }

    /// Drop both caches. Subsequent lookups recompute from the indexes.
    pub fn clear_caches(&mut self) {
        self.preferred.clear_cache();
        self.parent.clear_cache();
    }

    pub fn cache_stats(&self) -> ResolverCacheStats {
        ResolverCacheStats {
            preferred: self.preferred.cache_stats(),
            parent: self.parent.cache_stats(),
        }
    }

    /// Record counts of the preferred and parent indexes.
    pub fn index_sizes(&self) -> (usize, usize) {
        (self.preferred.index_len(), self.parent.index_len())
    }
}

impl<R: IndexLookup> Canonicalize for CanonicalResolver<R> {
    fn canonical(&mut self, id: CompoundId) -> Result<CompoundId> {
        let preferred = self.preferred(id)?;
        let canonical = self.parent(preferred)?;
        if canonical != id {
            debug!(%id, %preferred, %canonical, "remapped to canonical id");
        }
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molcanon_index::{MemoryIndex, PairRecord};

    fn id(raw: u32) -> CompoundId {
        CompoundId::new(raw)
    }

    fn resolver(preferred: &[(u32, u32)], parent: &[(u32, u32)]) -> CanonicalResolver<MemoryIndex> {
        let index = |pairs: &[(u32, u32)]| {
            MemoryIndex::from_records(pairs.iter().map(|&(k, v)| PairRecord::new(k, v)).collect())
        };
        CanonicalResolver::new(index(preferred), index(parent), 16)
    }

    #[test]
    fn unmapped_ids_are_their_own_forms() {
        let mut r = resolver(&[(5, 6)], &[(7, 8)]);
        assert_eq!(r.preferred(id(42)).unwrap(), id(42));
        assert_eq!(r.parent(id(42)).unwrap(), id(42));
        assert_eq!(r.canonical(id(42)).unwrap(), id(42));
    }

    #[test]
    fn preferred_then_parent() {
        let mut r = resolver(&[(22247451, 962)], &[(962, 900)]);
        assert_eq!(r.canonical(id(22247451)).unwrap(), id(900));
        assert_eq!(r.canonical(id(962)).unwrap(), id(900));
    }

    #[test]
    fn composition_is_single_pass() {
        // A -preferred-> B -parent-> C -preferred-> D
        let (a, b, c, d) = (1, 2, 3, 4);
        let mut r = resolver(&[(a, b), (c, d)], &[(b, c)]);
        let once = r.canonical(id(a)).unwrap();
        assert_eq!(once, id(c));
        let twice = r.canonical(once).unwrap();
        assert_eq!(twice, id(d));
        assert_ne!(once, twice);
    }

    #[test]
    fn misses_are_cached_as_identity() {
        let mut r = resolver(&[], &[]);
        r.canonical(id(9)).unwrap();
        r.canonical(id(9)).unwrap();
        let stats = r.cache_stats();
        assert_eq!(stats.preferred.hits, 1);
        assert_eq!(stats.preferred.misses, 1);
        assert_eq!(stats.preferred.len, 1);
    }

    #[test]
    fn clearing_caches_keeps_results_correct() {
        let mut r = resolver(&[(22247451, 962)], &[]);
        assert_eq!(r.canonical(id(22247451)).unwrap(), id(962));
        r.clear_caches();
        assert_eq!(r.cache_stats().preferred.len, 0);
        assert_eq!(r.cache_stats().parent.len, 0);
        assert_eq!(r.canonical(id(22247451)).unwrap(), id(962));
    }
}
