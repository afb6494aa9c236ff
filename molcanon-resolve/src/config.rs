//! Resolver configuration

use crate::error::{ResolveError, Result};
use molcanon_index::ReadStrategy;
use serde::Deserialize;

/// Default LRU capacity for each of the preferred and parent caches.
pub const DEFAULT_CACHE_CAPACITY: usize = 5_000;

/// Default cap on the number of structural keys with tracked conflicts.
pub const DEFAULT_MAX_CONFLICT_GROUPS: usize = 50_000;

/// Configuration for canonical and conflict resolution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Entries per lookup cache (one cache per index).
    ///
    /// Default: 5,000
    pub cache_capacity: usize,

    /// Maximum number of conflict groups kept in memory.
    ///
    /// When full, registering a new structural key evicts the group that was
    /// least recently registered into or resolved. Losing a group loses its
    /// conflict history, never already-committed data.
    /// Default: 50,000
    pub max_conflict_groups: usize,

    /// How index files are consulted.
    ///
    /// Default: on disk (constant memory).
    pub read_strategy: ReadStrategy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_conflict_groups: DEFAULT_MAX_CONFLICT_GROUPS,
            read_strategy: ReadStrategy::OnDisk,
        }
    }
}

impl ResolverConfig {
    /// Builder method to set the per-index cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Builder method to set the conflict-group cap
    pub fn with_max_conflict_groups(mut self, max_groups: usize) -> Self {
        self.max_conflict_groups = max_groups;
        self
    }

    /// Builder method to set the index read strategy
    pub fn with_read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.read_strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(ResolveError::InvalidConfig(
                "cache_capacity must be at least 1".into(),
            ));
        }
        if self.max_conflict_groups == 0 {
            return Err(ResolveError::InvalidConfig(
                "max_conflict_groups must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.cache_capacity, 5_000);
        assert_eq!(config.max_conflict_groups, 50_000);
        assert_eq!(config.read_strategy, ReadStrategy::OnDisk);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = ResolverConfig::default().with_cache_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(ResolveError::InvalidConfig(_))
        ));
        let config = ResolverConfig::default().with_max_conflict_groups(0);
        assert!(config.validate().is_err());
    }
}
