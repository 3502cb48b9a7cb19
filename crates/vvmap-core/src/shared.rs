//! Thread-safe handle around a [`Map`].
//!
//! A map assumes a single writer. When one replica is reached from several
//! threads, every operation has to be serialised against `set` and `merge`
//! so that a delta's records and its `current` vector come from the same
//! snapshot. `SharedMap` does that with one read-write lock over the whole
//! map.

use crate::delta::Delta;
use crate::map::{Map, MergeStats};
use crate::resolver::ConflictResolver;
use crate::version_vector::{ReplicaId, VersionVector};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct SharedMap<V, R> {
    inner: Arc<RwLock<Map<V, R>>>,
}

impl<V, R> Clone for SharedMap<V, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, R> SharedMap<V, R>
where
    V: Clone,
    R: ConflictResolver<V>,
{
    pub fn new(map: Map<V, R>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    pub fn id(&self) -> ReplicaId {
        self.inner.read().id().clone()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.inner.write().set(key, value);
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys()
    }

    pub fn version(&self) -> VersionVector {
        self.inner.read().version()
    }

    pub fn delta(&self, since: &VersionVector) -> Delta<V> {
        self.inner.read().delta(since)
    }

    pub fn merge(&self, delta: Delta<V>) -> MergeStats {
        self.inner.write().merge(delta)
    }

    /// Pull everything `other` has that this replica has not seen.
    ///
    /// The two locks are never held together, so two replicas syncing from
    /// each other concurrently cannot deadlock.
    pub fn sync_from(&self, other: &SharedMap<V, R>) -> MergeStats {
        let since = self.version();
        let delta = other.delta(&since);
        self.merge(delta)
    }

    /// Run `f` with shared access to the underlying map.
    pub fn with_read<T>(&self, f: impl FnOnce(&Map<V, R>) -> T) -> T {
        f(&self.inner.read())
    }
}
