//! Conflict groups: which ids have been seen for each structural key, and
//! which of them is the canonical representative.
//!
//! ## Resolution rule
//!
//! For a group of two or more ids, an id that is its own canonical form
//! (*self-canonical*) is preferred outright; among several self-canonical ids
//! the numerically smallest wins. When no id is self-canonical, the result is
//! `canonical(min(ids))`. Groups are kept as ordered sets, so the outcome
//! never depends on registration order.
//!
//! ## Bounding
//!
//! The group table is an LRU keyed by structural key. Registering a new key
//! into a full table evicts the least recently touched group (registered into
//! or resolved). Eviction loses that key's conflict history only.

use crate::canonical::Canonicalize;
use crate::error::Result;
use lru::LruCache;
use molcanon_index::CompoundId;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use tracing::debug;

/// Pick the canonical representative of `ids`, which must be sorted
/// ascending and non-empty.
pub fn resolve_group<C: Canonicalize + ?Sized>(
    ids: &[CompoundId],
    canon: &mut C,
) -> Result<Option<CompoundId>> {
    debug_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    let Some(&smallest) = ids.first() else {
        return Ok(None);
    };
    if ids.len() == 1 {
        return Ok(Some(smallest));
    }
    for &id in ids {
        if canon.canonical(id)? == id {
            return Ok(Some(id));
        }
    }
    canon.canonical(smallest).map(Some)
}

/// Bounded table of structural key → ids seen this session.
pub struct ConflictTracker {
    groups: LruCache<String, BTreeSet<CompoundId>>,
    evicted_groups: u64,
}

impl ConflictTracker {
    pub fn new(max_groups: usize) -> Self {
        let cap = NonZeroUsize::new(max_groups).unwrap_or(NonZeroUsize::MIN);
        Self {
            groups: LruCache::new(cap),
            evicted_groups: 0,
        }
    }

    /// Add `id` to the group for `key`. Returns `false` if it was already there.
    pub fn register(&mut self, key: &str, id: CompoundId) -> bool {
        if let Some(group) = self.groups.get_mut(key) {
            return group.insert(id);
        }
        if let Some((evicted, _)) = self.groups.push(key.to_owned(), BTreeSet::from([id])) {
            self.evicted_groups += 1;
            debug!(key = %evicted, "conflict table full; evicted least recently used group");
        }
        true
    }

    /// Canonical representative for `key`, or `None` if nothing is registered.
    pub fn resolve<C: Canonicalize + ?Sized>(
        &mut self,
        key: &str,
        canon: &mut C,
    ) -> Result<Option<CompoundId>> {
        let ids: Vec<CompoundId> = match self.groups.get(key) {
            Some(group) => group.iter().copied().collect(),
            None => return Ok(None),
        };
        let resolved = resolve_group(&ids, canon)?;
        if ids.len() > 1 {
            debug!(key, group = ?ids, resolved = ?resolved, "resolved structural key conflict");
        }
        Ok(resolved)
    }

    /// Ids registered for `key`, without touching recency.
    pub fn group(&self, key: &str) -> Option<&BTreeSet<CompoundId>> {
        self.groups.peek(key)
    }

    /// Drop every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.groups.cap().get()
    }

    /// Groups dropped so far because the table was full.
    pub fn evicted_groups(&self) -> u64 {
        self.evicted_groups
    }
}
