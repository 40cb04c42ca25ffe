//! Snapshot-keyed memoization
//!
//! Derived union data (filtered variants, the sum, the display name) is cached
//! per namespace snapshot. Only the most recently observed snapshot is kept:
//! observing a different snapshot evicts every entry of the previous one, so
//! memory stays bounded no matter how often the namespace changes.
//!
//! Entries live in a sharded concurrent map. Computation always runs with no
//! lock held, so a compute closure may itself call back into the cache (the
//! sum is built from the cached variant list). Concurrent misses for the same
//! key may compute twice; the first stored value wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tracing::debug;
use unionx_core_types::{NamespaceId, Snapshot};

use crate::errors::Result;

/// Derived value an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOp {
    Variants,
    Sum,
    DisplayName,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    namespace: NamespaceId,
    snapshot: Snapshot,
    op: CacheOp,
}

/// Counters describing cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of compute closures run
    pub computations: u64,
    /// Number of entries dropped because their snapshot was superseded
    pub evictions: u64,
    /// Entries currently stored
    pub live_entries: usize,
}

/// Single-slot, snapshot-keyed cache for one namespace
pub struct SnapshotCache<V> {
    namespace: NamespaceId,
    entries: DashMap<CacheKey, V>,
    latest: Mutex<Option<Snapshot>>,
    computations: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> SnapshotCache<V> {
    pub fn new(namespace: NamespaceId) -> Self {
        Self {
            namespace,
            entries: DashMap::new(),
            latest: Mutex::new(None),
            computations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the value cached for `(snapshot, op)`, computing it on a miss
    ///
    /// # Errors
    ///
    /// Propagates the error of `compute`. Failed computations are not stored.
    pub fn get_or_compute<F>(&self, snapshot: &Snapshot, op: CacheOp, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        self.observe(snapshot);

        let key = CacheKey {
            namespace: self.namespace.clone(),
            snapshot: snapshot.clone(),
            op,
        };
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.value().clone());
        }

        self.computations.fetch_add(1, Ordering::Relaxed);
        debug!(
            namespace_id = %self.namespace,
            cache_op = ?op,
            snapshot_len = snapshot.len(),
            "computing derived union data"
        );
        let value = compute()?;

        // Only the live snapshot may be stored; a caller that raced with a
        // newer observation still gets its value, uncached.
        let latest = self.latest();
        if latest.as_ref() == Some(snapshot) {
            let stored = self.entries.entry(key).or_insert(value).value().clone();
            return Ok(stored);
        }
        Ok(value)
    }

    /// Current statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            computations: self.computations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            live_entries: self.entries.len(),
        }
    }

    /// Snapshot whose entries are currently retained
    pub fn live_snapshot(&self) -> Option<Snapshot> {
        self.latest().clone()
    }

    fn observe(&self, snapshot: &Snapshot) {
        let mut latest = self.latest();
        if latest.as_ref() == Some(snapshot) {
            return;
        }

        if latest.replace(snapshot.clone()).is_some() {
            let mut evicted = 0u64;
            self.entries.retain(|key, _| {
                let keep = key.snapshot == *snapshot;
                if !keep {
                    evicted += 1;
                }
                keep
            });
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
            debug!(
                namespace_id = %self.namespace,
                evicted,
                snapshot_len = snapshot.len(),
                "evicted superseded snapshot"
            );
        }
    }

    fn latest(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UnionError;
    use std::sync::Arc;
    use unionx_core_types::SnapshotEntry;

    fn snap(names: &[&str]) -> Snapshot {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| SnapshotEntry {
                name: name.to_string(),
                revision: i as u64 + 1,
            })
            .collect()
    }

    #[test]
    fn test_hit_does_not_recompute() {
        let cache: SnapshotCache<u32> = SnapshotCache::new(NamespaceId::new());
        let key = snap(&["A"]);

        assert_eq!(cache.get_or_compute(&key, CacheOp::Variants, || Ok(1)).unwrap(), 1);
        assert_eq!(cache.get_or_compute(&key, CacheOp::Variants, || Ok(2)).unwrap(), 1);
        assert_eq!(cache.stats().computations, 1);
    }

    #[test]
    fn test_ops_are_cached_independently() {
        let cache: SnapshotCache<u32> = SnapshotCache::new(NamespaceId::new());
        let key = snap(&["A"]);

        cache.get_or_compute(&key, CacheOp::Variants, || Ok(1)).unwrap();
        let name = cache.get_or_compute(&key, CacheOp::DisplayName, || Ok(9)).unwrap();
        assert_eq!(name, 9);
        assert_eq!(cache.stats().live_entries, 2);
    }

    #[test]
    fn test_new_snapshot_evicts_previous_entries() {
        let cache: SnapshotCache<u32> = SnapshotCache::new(NamespaceId::new());
        let first = snap(&["A"]);
        let second = snap(&["A", "B"]);

        cache.get_or_compute(&first, CacheOp::Variants, || Ok(1)).unwrap();
        cache.get_or_compute(&first, CacheOp::Sum, || Ok(1)).unwrap();
        cache.get_or_compute(&second, CacheOp::Variants, || Ok(2)).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.live_entries, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(cache.live_snapshot(), Some(second));

        // Returning to an old snapshot recomputes
        let again = cache.get_or_compute(&first, CacheOp::Variants, || Ok(3)).unwrap();
        assert_eq!(again, 3);
    }

    #[test]
    fn test_failed_compute_is_not_stored() {
        let cache: SnapshotCache<u32> = SnapshotCache::new(NamespaceId::new());
        let key = snap(&["A"]);

        let err = cache
            .get_or_compute(&key, CacheOp::Variants, || {
                Err(UnionError::Internal {
                    message: "boom".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, UnionError::Internal { .. }));
        assert_eq!(cache.stats().live_entries, 0);

        assert_eq!(cache.get_or_compute(&key, CacheOp::Variants, || Ok(5)).unwrap(), 5);
    }

    #[test]
    fn test_compute_may_reenter_cache() {
        let cache: SnapshotCache<u32> = SnapshotCache::new(NamespaceId::new());
        let key = snap(&["A"]);

        let sum = cache
            .get_or_compute(&key, CacheOp::Sum, || {
                let variants = cache.get_or_compute(&key, CacheOp::Variants, || Ok(20))?;
                Ok(variants + 1)
            })
            .unwrap();
        assert_eq!(sum, 21);
        assert_eq!(cache.stats().live_entries, 2);
    }

    #[test]
    fn test_concurrent_access_keeps_single_snapshot() {
        let cache: Arc<SnapshotCache<usize>> = Arc::new(SnapshotCache::new(NamespaceId::new()));
        let snapshots: Vec<Snapshot> = (0..4)
            .map(|i| snap(&["A", &format!("V{}", i)]))
            .collect();

        std::thread::scope(|scope| {
            for t in 0..8 {
                let cache = cache.clone();
                let snapshots = &snapshots;
                scope.spawn(move || {
                    for round in 0..200 {
                        let snapshot = &snapshots[(t + round) % snapshots.len()];
                        let len = snapshot.len();
                        let value = cache
                            .get_or_compute(snapshot, CacheOp::Variants, || Ok(len))
                            .unwrap();
                        assert_eq!(value, len);
                    }
                });
            }
        });

        // Every retained entry belongs to the live snapshot
        let live = cache.live_snapshot().unwrap();
        let final_value = cache
            .get_or_compute(&live, CacheOp::Variants, || Ok(usize::MAX))
            .unwrap();
        assert_eq!(final_value, live.len());
        assert!(cache.stats().live_entries <= 1);
    }
}
