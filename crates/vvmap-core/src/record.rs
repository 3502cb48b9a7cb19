//! Stored values tagged with the dot of the write that produced them.

use crate::dot::Dot;
use serde::{Deserialize, Serialize};

/// A value stored under `key`, produced by the write identified by `dot`.
///
/// Records are replaced wholesale on overwrite; a map never edits one in
/// place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<V> {
    pub key: String,
    pub value: V,
    pub dot: Dot,
}

impl<V> Record<V> {
    pub fn new(key: impl Into<String>, value: V, dot: Dot) -> Self {
        Self {
            key: key.into(),
            value,
            dot,
        }
    }
}
