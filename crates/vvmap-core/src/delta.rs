//! Deltas: the unit of exchange between replicas.
//!
//! A delta bundles every record a producer holds that the requester's
//! version vector (`since`) does not yet cover, together with the
//! producer's own version vector at the moment the records were selected
//! (`current`). The two must come from the same snapshot: merge uses
//! `current` to decide whether the requester's local record was already
//! known to the producer.

use crate::record::Record;
use crate::version_vector::VersionVector;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta<V> {
    since: VersionVector,
    current: VersionVector,
    records: Vec<Record<V>>,
}

impl<V> Delta<V> {
    /// Assemble a delta from its parts.
    ///
    /// Normally deltas come from [`crate::Map::delta`]. This constructor
    /// exists for codecs that rebuild a delta received over the wire; the
    /// caller is responsible for `current` matching the snapshot `records`
    /// were taken from.
    pub fn new(since: VersionVector, current: VersionVector, records: Vec<Record<V>>) -> Self {
        Self {
            since,
            current,
            records,
        }
    }

    /// The baseline the requester supplied.
    pub fn since(&self) -> &VersionVector {
        &self.since
    }

    /// The producer's version vector when the delta was computed.
    pub fn current(&self) -> &VersionVector {
        &self.current
    }

    pub fn records(&self) -> &[Record<V>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// A delta with no records may still carry causal information in
    /// `current`, so empty deltas are still worth merging.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (VersionVector, VersionVector, Vec<Record<V>>) {
        (self.since, self.current, self.records)
    }
}
