//! vvmap core - a delta-state CRDT key-value map
//!
//! Replicas accept writes independently and converge by exchanging small
//! deltas instead of full state. Causality is tracked with version vectors
//! and every write carries a dot (replica id, counter), which lets a merge
//! tell apart writes it has already seen, writes that causally supersede
//! the local value, and genuinely concurrent writes. Only the last kind is
//! handed to the caller-supplied [`ConflictResolver`].
//!
//! # Example
//!
//! ```rust
//! use vvmap_core::{GreatestValue, Map};
//!
//! let mut alice = Map::new("alice", GreatestValue);
//! let mut bob = Map::new("bob", GreatestValue);
//!
//! alice.set("lunch", "turkey".to_string());
//! bob.set("lunch", "ham".to_string());
//!
//! alice.merge(bob.delta(&alice.version()));
//! bob.merge(alice.delta(&bob.version()));
//!
//! assert_eq!(alice.get("lunch"), Some(&"turkey".to_string()));
//! assert_eq!(bob.get("lunch"), Some(&"turkey".to_string()));
//! ```

pub mod delta;
pub mod dot;
pub mod error;
pub mod lattice;
pub mod map;
pub mod record;
pub mod resolver;
pub mod shared;
pub mod version_vector;

pub use delta::Delta;
pub use dot::Dot;
pub use error::{Result, VvMapError};
pub use lattice::Lattice;
pub use map::{Map, MapConfig, MapConfigBuilder, MergeStats};
pub use record::Record;
pub use resolver::{check_resolver, ConflictResolver, GreatestValue, HighestDot};
pub use shared::SharedMap;
pub use version_vector::{ReplicaId, VersionVector};
