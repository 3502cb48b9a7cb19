//! Error types for the map core.

use crate::dot::Dot;
use thiserror::Error;

/// Errors surfaced by the core.
///
/// Reads, writes, deltas and merges never fail. The only detectable fault
/// is a conflict resolver that picks different winners depending on
/// argument order, which would make replicas diverge permanently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VvMapError {
    #[error("Inconsistent resolver for key {key}: picked {forward} then {backward} for the same pair")]
    InconsistentResolver {
        key: String,
        forward: Dot,
        backward: Dot,
    },
}

pub type Result<T> = std::result::Result<T, VvMapError>;
