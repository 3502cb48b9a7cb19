//! vvmap sync - anti-entropy simulation for map replicas
//!
//! Moving deltas between real replicas is left to the embedding system.
//! This crate provides an in-process stand-in: a cluster of
//! [`vvmap_core::Map`] replicas wired through a network that can lose,
//! duplicate and reorder messages, used to check that replicas still
//! converge.
//!
//! # Example
//!
//! ```rust
//! use vvmap_core::GreatestValue;
//! use vvmap_sync::{AntiEntropyCluster, NetworkConfig};
//!
//! let mut cluster = AntiEntropyCluster::new(3, GreatestValue, NetworkConfig::chaotic());
//! cluster.set(0, "lunch", "turkey".to_string());
//! cluster.set(1, "lunch", "ham".to_string());
//!
//! while !cluster.is_converged() {
//!     cluster.full_sync_round();
//!     cluster.retransmit_and_process();
//! }
//! assert_eq!(cluster.replica(2).get("lunch"), Some(&"turkey".to_string()));
//! ```

pub mod anti_entropy;
pub mod network;

pub use anti_entropy::AntiEntropyCluster;
pub use network::{NetworkConfig, NetworkSimulator, SyncMessage};
