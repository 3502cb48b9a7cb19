//! The replicated key-value map.
//!
//! Every local write is stamped with a fresh dot from the map's own
//! counter. Replicas synchronise by pulling a [`Delta`] relative to their
//! version vector and merging it:
//!
//! ```text
//! On local set(k, v):
//!   V[me] += 1
//!   S[k] = (k, v, (me, V[me]))
//!
//! On delta(since):
//!   R = { r ∈ S | since[r.dot.source] < r.dot.version }
//!   return (since, V, R)
//!
//! On merge((since, current, R)):
//!   for r in R:
//!     if r.dot ∈ V                        → skip   (already seen)
//!     l = S[r.key]
//!     if l is none or l.dot ∈ current     → S[r.key] = r
//!     else                                → S[r.key] = resolve(l, r)
//!   V = V ⊔ current
//! ```
//!
//! A map stores one record per key, so a write that replaces the local
//! value is never compared against writes the replaced value had already
//! beaten. Replicas can end up disagreeing on a key when
//!
//! - three or more replicas keep writing it while they sync, or
//! - a producer overwrites it between computing a delta and that delta
//!   being merged.
//!
//! Single-writer keys, two replicas pulling fresh deltas, and workloads
//! where every write happens before syncing always converge.

use crate::delta::Delta;
use crate::dot::Dot;
use crate::lattice::Lattice;
use crate::record::Record;
use crate::resolver::{check_resolver, ConflictResolver};
use crate::version_vector::{ReplicaId, VersionVector};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, trace};

/// Tuning knobs for a [`Map`].
#[derive(Clone, Debug)]
pub struct MapConfig {
    /// Evaluate the resolver in both argument orders on every conflict and
    /// log when it picks different winners. Costs one extra resolver call
    /// per conflict; enabled by default in debug builds.
    pub verify_resolver: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            verify_resolver: cfg!(debug_assertions),
        }
    }
}

/// Builder for map configuration.
pub struct MapConfigBuilder {
    config: MapConfig,
}

impl MapConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
        }
    }

    pub fn verify_resolver(mut self, enabled: bool) -> Self {
        self.config.verify_resolver = enabled;
        self
    }

    pub fn build(self) -> MapConfig {
        self.config
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// How the records of one delta were classified during merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records whose dot the map had already incorporated.
    pub skipped: usize,
    /// Records adopted without consulting the resolver.
    pub adopted: usize,
    /// Concurrent writes handed to the resolver.
    pub conflicts: usize,
    /// Conflicts where the resolver kept the local record.
    pub kept_local: usize,
    /// Conflicts where the resolver's choice depended on argument order.
    /// Only counted when [`MapConfig::verify_resolver`] is set.
    pub resolver_violations: usize,
}

/// A delta-state CRDT map from string keys to values of type `V`.
///
/// A map is single-writer: every method takes `&self` or `&mut self`, and
/// sharing one across threads goes through [`crate::SharedMap`].
pub struct Map<V, R> {
    resolver: R,
    storage: BTreeMap<String, Record<V>>,
    version: VersionVector,
    me: ReplicaId,
    config: MapConfig,
}

impl<V, R> Map<V, R>
where
    V: Clone,
    R: ConflictResolver<V>,
{
    /// Create an empty map for replica `id`.
    ///
    /// `id` must be unique among every replica this map will ever exchange
    /// deltas with, and `resolver` must satisfy the contract documented in
    /// [`crate::resolver`]. Neither can be checked here.
    pub fn new(id: impl Into<ReplicaId>, resolver: R) -> Self {
        Self::with_config(id, resolver, MapConfig::default())
    }

    pub fn with_config(id: impl Into<ReplicaId>, resolver: R, config: MapConfig) -> Self {
        Self {
            resolver,
            storage: BTreeMap::new(),
            version: VersionVector::bottom(),
            me: id.into(),
            config,
        }
    }

    pub fn id(&self) -> &ReplicaId {
        &self.me
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Current value for `key`, `None` if it was never written.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.storage.get(key).map(|record| &record.value)
    }

    /// The full record (value and dot) stored for `key`.
    pub fn get_record(&self, key: &str) -> Option<&Record<V>> {
        self.storage.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.storage.contains_key(key)
    }

    /// Write `value` under `key`. Local writes always win locally.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let counter = self.version.increment(&self.me);
        let record = Record::new(key, value, Dot::new(self.me.clone(), counter));
        trace!(replica = %self.me, key = %record.key, dot = %record.dot, "set");
        self.storage.insert(record.key.clone(), record);
    }

    /// Keys currently present, in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.storage.keys().cloned().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record<V>> {
        self.storage.values()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// A copy of this map's version vector.
    pub fn version(&self) -> VersionVector {
        self.version.duplicate()
    }

    /// Every record not yet reflected in `since`, paired with a snapshot of
    /// this map's version vector.
    pub fn delta(&self, since: &VersionVector) -> Delta<V> {
        let records: Vec<Record<V>> = self
            .storage
            .values()
            .filter(|record| !since.contains(&record.dot))
            .cloned()
            .collect();

        debug!(
            replica = %self.me,
            since = %since,
            records = records.len(),
            "computed delta"
        );

        Delta::new(since.duplicate(), self.version.duplicate(), records)
    }

    /// Fold a delta from another replica into this one.
    ///
    /// Safe under duplication and reordering: merging a delta that has
    /// already been merged changes nothing.
    pub fn merge(&mut self, delta: Delta<V>) -> MergeStats {
        let (_since, current, records) = delta.into_parts();
        let mut stats = MergeStats::default();

        for record in records {
            if self.version.contains(&record.dot) {
                trace!(replica = %self.me, key = %record.key, dot = %record.dot, "already seen");
                stats.skipped += 1;
                continue;
            }

            let local = match self.storage.get(&record.key) {
                Some(local) if !current.contains(&local.dot) => local,
                _ => {
                    trace!(replica = %self.me, key = %record.key, dot = %record.dot, "adopt");
                    stats.adopted += 1;
                    self.storage.insert(record.key.clone(), record);
                    continue;
                }
            };

            stats.conflicts += 1;
            if self.config.verify_resolver {
                if let Err(err) = check_resolver(&self.resolver, &record.key, local, &record) {
                    error!(replica = %self.me, error = %err, "conflict resolver is order dependent");
                    stats.resolver_violations += 1;
                }
            }

            if self.resolver.choose_left(&record.key, local, &record) {
                trace!(
                    replica = %self.me,
                    key = %record.key,
                    local = %local.dot,
                    incoming = %record.dot,
                    "conflict: kept local"
                );
                stats.kept_local += 1;
            } else {
                trace!(
                    replica = %self.me,
                    key = %record.key,
                    local = %local.dot,
                    incoming = %record.dot,
                    "conflict: took incoming"
                );
                self.storage.insert(record.key.clone(), record);
            }
        }

        self.version.join_assign(&current);

        debug!(
            replica = %self.me,
            version = %self.version,
            skipped = stats.skipped,
            adopted = stats.adopted,
            conflicts = stats.conflicts,
            "merged delta"
        );

        stats
    }
}

impl<V: fmt::Debug, R> fmt::Debug for Map<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("me", &self.me)
            .field("version", &self.version)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
