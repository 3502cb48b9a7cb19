//! Simulated network for exercising anti-entropy under faults.
//!
//! Messages can be lost, duplicated and reordered according to a
//! [`NetworkConfig`]. Randomness comes from a seeded generator so every
//! run of a test sees the same sequence of faults.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::trace;
use vvmap_core::{Delta, ReplicaId, VersionVector};

/// Message types for the pull-based sync protocol
#[derive(Debug, Clone)]
pub enum SyncMessage<V> {
    /// `from` asks `to` for everything not covered by `since`
    Request {
        from: ReplicaId,
        to: ReplicaId,
        since: VersionVector,
    },
    /// Reply to a request
    Delta {
        from: ReplicaId,
        to: ReplicaId,
        delta: Delta<V>,
    },
}

impl<V> SyncMessage<V> {
    pub fn to(&self) -> &ReplicaId {
        match self {
            SyncMessage::Request { to, .. } | SyncMessage::Delta { to, .. } => to,
        }
    }
}

/// Network configuration for simulation
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Probability of message loss (0.0 - 1.0)
    pub loss_rate: f64,
    /// Probability of message duplication (0.0 - 1.0)
    pub dup_rate: f64,
    /// Probability of message reordering (0.0 - 1.0)
    pub reorder_rate: f64,
    /// Seed for the fault generator
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            loss_rate: 0.0,
            dup_rate: 0.0,
            reorder_rate: 0.0,
            seed: 12345,
        }
    }
}

impl NetworkConfig {
    /// Create a lossy network configuration
    pub fn lossy(loss_rate: f64) -> Self {
        Self {
            loss_rate,
            ..Default::default()
        }
    }

    /// Create a network with duplicates
    pub fn with_dups(dup_rate: f64) -> Self {
        Self {
            dup_rate,
            ..Default::default()
        }
    }

    /// Create a chaotic network (all problems)
    pub fn chaotic() -> Self {
        Self {
            loss_rate: 0.1,
            dup_rate: 0.2,
            reorder_rate: 0.3,
            ..Default::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// In-memory network that drops, duplicates and shuffles messages
#[derive(Debug)]
pub struct NetworkSimulator<M> {
    in_flight: VecDeque<M>,
    lost: Vec<M>,
    config: NetworkConfig,
    rng: StdRng,
}

impl<M: Clone> NetworkSimulator<M> {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            in_flight: VecDeque::new(),
            lost: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Send a message through the network
    pub fn send(&mut self, msg: M) {
        if self.rng.gen_bool(self.config.loss_rate) {
            trace!("message lost");
            self.lost.push(msg);
            return;
        }

        if self.rng.gen_bool(self.config.dup_rate) {
            trace!("message duplicated");
            self.in_flight.push_back(msg.clone());
        }

        self.in_flight.push_back(msg);
        if self.rng.gen_bool(self.config.reorder_rate) {
            let last = self.in_flight.len() - 1;
            let pos = self.rng.gen_range(0..=last);
            self.in_flight.swap(pos, last);
        }
    }

    /// Receive the next message (if any)
    pub fn receive(&mut self) -> Option<M> {
        self.in_flight.pop_front()
    }

    /// Re-send lost messages (simulates retransmission)
    pub fn retransmit_lost(&mut self) {
        for msg in self.lost.drain(..) {
            self.in_flight.push_back(msg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn lost_count(&self) -> usize {
        self.lost.len()
    }
}
