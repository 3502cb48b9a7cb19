//! Conflict resolvers for concurrent writes to the same key.
//!
//! A resolver is consulted only when two records for one key were written
//! without either replica having seen the other's write. It must be a
//! deterministic, pure function whose choice does not depend on argument
//! order: if `choose_left(k, a, b)` keeps `a`, then `choose_left(k, b, a)`
//! must keep `a` too. A resolver that breaks this rule does not cause an
//! error; replicas silently and permanently disagree. Use
//! [`check_resolver`] (or [`crate::MapConfig::verify_resolver`]) to catch
//! this during development.

use crate::error::{Result, VvMapError};
use crate::record::Record;

/// Decides which of two concurrent records survives.
pub trait ConflictResolver<V> {
    /// Return `true` to keep `left` (the local record), `false` to adopt
    /// `right` (the incoming one). Both records carry `key`.
    fn choose_left(&self, key: &str, left: &Record<V>, right: &Record<V>) -> bool;
}

impl<V, F> ConflictResolver<V> for F
where
    F: Fn(&str, &Record<V>, &Record<V>) -> bool,
{
    fn choose_left(&self, key: &str, left: &Record<V>, right: &Record<V>) -> bool {
        self(key, left, right)
    }
}

/// Keeps the greatest value; equal values fall back to the greater dot.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreatestValue;

impl<V: Ord> ConflictResolver<V> for GreatestValue {
    fn choose_left(&self, _key: &str, left: &Record<V>, right: &Record<V>) -> bool {
        (&left.value, &left.dot) >= (&right.value, &right.dot)
    }
}

/// Keeps the record with the greater dot (counter, then replica id).
///
/// Behaves like last-writer-wins where "later" means a higher counter on
/// the writing replica.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighestDot;

impl<V> ConflictResolver<V> for HighestDot {
    fn choose_left(&self, _key: &str, left: &Record<V>, right: &Record<V>) -> bool {
        left.dot >= right.dot
    }
}

/// Run `resolver` on both argument orders and make sure the same record
/// wins each time.
pub fn check_resolver<V, R>(resolver: &R, key: &str, a: &Record<V>, b: &Record<V>) -> Result<()>
where
    R: ConflictResolver<V> + ?Sized,
{
    let forward = if resolver.choose_left(key, a, b) { a } else { b };
    let backward = if resolver.choose_left(key, b, a) { b } else { a };

    if forward.dot == backward.dot {
        Ok(())
    } else {
        Err(VvMapError::InconsistentResolver {
            key: key.to_string(),
            forward: forward.dot.clone(),
            backward: backward.dot.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dot::Dot;

    fn rec(value: &str, source: &str, version: u64) -> Record<String> {
        Record::new("k", value.to_string(), Dot::new(source, version))
    }

    #[test]
    fn test_greatest_value_is_order_independent() {
        let a = rec("turkey", "alice", 1);
        let b = rec("ham", "bob", 1);

        assert!(GreatestValue.choose_left("k", &a, &b));
        assert!(!GreatestValue.choose_left("k", &b, &a));
        assert!(check_resolver(&GreatestValue, "k", &a, &b).is_ok());
    }

    #[test]
    fn test_greatest_value_ties_break_on_dot() {
        let a = rec("same", "alice", 1);
        let b = rec("same", "bob", 1);

        // bob:1 > alice:1, so bob's record wins from either side
        assert!(!GreatestValue.choose_left("k", &a, &b));
        assert!(GreatestValue.choose_left("k", &b, &a));
        assert!(check_resolver(&GreatestValue, "k", &a, &b).is_ok());
    }

    #[test]
    fn test_highest_dot() {
        let a = rec("x", "alice", 3);
        let b = rec("y", "bob", 2);

        assert!(HighestDot.choose_left("k", &a, &b));
        assert!(!HighestDot.choose_left("k", &b, &a));
        assert!(check_resolver(&HighestDot, "k", &a, &b).is_ok());
    }

    #[test]
    fn test_closure_resolver() {
        let shortest = |_: &str, l: &Record<String>, r: &Record<String>| {
            (l.value.len(), &l.dot) <= (r.value.len(), &r.dot)
        };
        let a = rec("ham", "bob", 1);
        let b = rec("turkey", "alice", 1);

        assert!(shortest.choose_left("k", &a, &b));
        assert!(check_resolver(&shortest, "k", &a, &b).is_ok());
    }

    #[test]
    fn test_check_resolver_flags_always_left() {
        let always_left = |_: &str, _: &Record<String>, _: &Record<String>| true;
        let a = rec("turkey", "alice", 1);
        let b = rec("ham", "bob", 1);

        let err = check_resolver(&always_left, "k", &a, &b).unwrap_err();
        assert_eq!(
            err,
            VvMapError::InconsistentResolver {
                key: "k".to_string(),
                forward: Dot::new("alice", 1),
                backward: Dot::new("bob", 1),
            }
        );
    }
}
