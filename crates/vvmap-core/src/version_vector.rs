//! Version vectors keyed by replica identifier.
//!
//! A version vector records, for every replica a map has heard from, how
//! many of that replica's writes have been incorporated. Absent entries are
//! implicitly zero and zero entries are never stored, so two vectors that
//! describe the same causal history always compare equal.

use crate::dot::Dot;
use crate::lattice::Lattice;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a replica. Must be unique across every replica
/// sharing a map; it is only ever compared, never interpreted.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaId(String);

impl ReplicaId {
    pub fn new(id: impl Into<String>) -> Self {
        ReplicaId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReplicaId {
    fn from(id: &str) -> Self {
        ReplicaId(id.to_string())
    }
}

impl From<String> for ReplicaId {
    fn from(id: String) -> Self {
        ReplicaId(id)
    }
}

impl Borrow<str> for ReplicaId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A version vector tracking the highest counter seen from each replica.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EncodedVersionVector")]
pub struct VersionVector {
    entries: BTreeMap<ReplicaId, u64>,
}

/// Wire form of a [`VersionVector`]. Decoding goes through
/// [`VersionVector::from_entries`] so zero counters never get stored.
#[derive(Deserialize)]
struct EncodedVersionVector {
    entries: BTreeMap<ReplicaId, u64>,
}

impl From<EncodedVersionVector> for VersionVector {
    fn from(encoded: EncodedVersionVector) -> Self {
        VersionVector::from_entries(encoded.entries)
    }
}

impl VersionVector {
    /// Create an empty version vector.
    pub fn new() -> Self {
        VersionVector {
            entries: BTreeMap::new(),
        }
    }

    /// Create a version vector from entries. Zero counters are dropped.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<ReplicaId>,
    {
        VersionVector {
            entries: entries
                .into_iter()
                .filter(|(_, counter)| *counter > 0)
                .map(|(id, counter)| (id.into(), counter))
                .collect(),
        }
    }

    /// Counter for a replica, 0 if it has never been seen.
    pub fn get(&self, id: &str) -> u64 {
        self.entries.get(id).copied().unwrap_or(0)
    }

    /// Advance the counter for a replica, returning the new value.
    ///
    /// Only a map's own entry is ever incremented; everything else arrives
    /// through [`VersionVector::merge`].
    pub fn increment(&mut self, id: &ReplicaId) -> u64 {
        let entry = self.entries.entry(id.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Merge with another version vector (element-wise max).
    pub fn merge(&mut self, other: &VersionVector) {
        for (id, &counter) in &other.entries {
            if counter == 0 {
                continue;
            }
            let current = self.entries.entry(id.clone()).or_insert(0);
            *current = (*current).max(counter);
        }
    }

    /// Create a merged version vector without modifying self.
    pub fn merged_with(&self, other: &VersionVector) -> VersionVector {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// An independent copy. Handed out whenever a map's clock crosses the
    /// public interface so callers never alias the internal vector.
    pub fn duplicate(&self) -> VersionVector {
        self.clone()
    }

    /// Whether the event identified by `dot` is already reflected here.
    pub fn contains(&self, dot: &Dot) -> bool {
        dot.version <= self.get(dot.source.as_str())
    }

    /// True if for every replica, self[r] >= other[r].
    pub fn dominates(&self, other: &VersionVector) -> bool {
        other
            .entries
            .iter()
            .all(|(id, &counter)| self.get(id.as_str()) >= counter)
    }

    /// dominates(other) and self != other.
    pub fn strictly_dominates(&self, other: &VersionVector) -> bool {
        self.dominates(other) && self != other
    }

    /// Neither vector dominates the other.
    pub fn is_concurrent_with(&self, other: &VersionVector) -> bool {
        !self.dominates(other) && !other.dominates(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ReplicaId, &u64)> {
        self.entries.iter()
    }

    /// Number of replicas tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counters (total events observed).
    pub fn total_events(&self) -> u64 {
        self.entries.values().sum()
    }
}

impl Lattice for VersionVector {
    fn bottom() -> Self {
        VersionVector::new()
    }

    fn join_assign(&mut self, other: &Self) {
        self.merge(other);
    }

    fn leq(&self, other: &Self) -> bool {
        other.dominates(self)
    }
}

impl<K: Into<ReplicaId>> FromIterator<(K, u64)> for VersionVector {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        VersionVector::from_entries(iter)
    }
}

impl fmt::Display for VersionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (id, counter)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", id, counter)?;
        }
        f.write_str("}")
    }
}
