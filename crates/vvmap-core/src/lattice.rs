//! Join-semilattice trait for causal metadata
//!
//! A map's version vector only ever grows: local writes bump one entry and
//! merges take the element-wise max with a peer's `current`. Both are
//! joins, so the vector can absorb the same delta any number of times and
//! in any order. Implementors must make `join_assign` commutative,
//! associative and idempotent, and `leq` must agree with it:
//! `a.leq(b)` iff `a ⊔ b == b`.

use std::cmp::Ordering;

pub trait Lattice: Clone + PartialEq {
    /// The element every other element is above.
    fn bottom() -> Self;

    /// Raise `self` to the least upper bound of `self` and `other`.
    fn join_assign(&mut self, other: &Self);

    /// Whether `self` is below or equal to `other`.
    fn leq(&self, other: &Self) -> bool;

    fn join(&self, other: &Self) -> Self {
        let mut joined = self.clone();
        joined.join_assign(other);
        joined
    }

    /// Partial order between two elements, `None` when they are concurrent.
    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self.leq(other), other.leq(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version_vector::VersionVector;

    #[test]
    fn test_bottom_is_below_everything() {
        let vv = VersionVector::from_entries([("a", 2), ("b", 1)]);
        assert!(VersionVector::bottom().leq(&vv));
        assert_eq!(VersionVector::bottom().join(&vv), vv);
    }

    #[test]
    fn test_join_is_idempotent_and_commutative() {
        let a = VersionVector::from_entries([("a", 3), ("b", 1)]);
        let b = VersionVector::from_entries([("b", 4), ("c", 2)]);

        assert_eq!(a.join(&a), a);
        assert_eq!(a.join(&b), b.join(&a));
        assert!(a.leq(&a.join(&b)));
        assert!(b.leq(&a.join(&b)));
    }

    #[test]
    fn test_compare() {
        let low = VersionVector::from_entries([("a", 1)]);
        let high = VersionVector::from_entries([("a", 2), ("b", 1)]);
        let side = VersionVector::from_entries([("c", 1)]);

        assert_eq!(low.compare(&high), Some(Ordering::Less));
        assert_eq!(high.compare(&low), Some(Ordering::Greater));
        assert_eq!(low.compare(&low.duplicate()), Some(Ordering::Equal));
        assert_eq!(low.compare(&side), None);
    }
}
