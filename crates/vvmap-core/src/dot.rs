//! Dots: identifiers of single write events.

use crate::version_vector::ReplicaId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A unique identifier for a write operation.
///
/// `version` is the value of `source`'s own counter right after the write,
/// so a replica never issues the same dot twice.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dot {
    pub source: ReplicaId,
    pub version: u64,
}

impl Dot {
    pub fn new(source: impl Into<ReplicaId>, version: u64) -> Self {
        Self {
            source: source.into(),
            version,
        }
    }
}

// Version first, then source. This is an arbitrary but total order used for
// deterministic tie-breaks; it says nothing about causality.
impl Ord for Dot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.source.cmp(&other.source))
    }
}

impl PartialOrd for Dot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_order_is_version_then_source() {
        let a1 = Dot::new("a", 1);
        let b1 = Dot::new("b", 1);
        let a2 = Dot::new("a", 2);

        assert!(a1 < b1);
        assert!(b1 < a2);
        assert_eq!(a1.cmp(&Dot::new("a", 1)), Ordering::Equal);
    }

    #[test]
    fn test_dot_display() {
        assert_eq!(Dot::new("alice", 3).to_string(), "alice:3");
    }
}
