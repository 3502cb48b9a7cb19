//! Pull-based anti-entropy between map replicas
//!
//! Each round, a replica asks a peer for everything its own version
//! vector does not yet cover and merges the reply:
//!
//! 1. requester i: send Request(V_i) to j
//! 2. producer j:  reply with Delta = j.delta(V_i)
//! 3. requester i: i.merge(Delta)
//!
//! No acknowledgements or retry bookkeeping are needed. A lost request or
//! reply only delays convergence until the next round, and a duplicated or
//! stale reply is absorbed by the merge's already-seen check.

use crate::network::{NetworkConfig, NetworkSimulator, SyncMessage};
use tracing::{debug, warn};
use vvmap_core::{ConflictResolver, Map, Record, ReplicaId};

/// A fixed set of replicas connected through a [`NetworkSimulator`]
pub struct AntiEntropyCluster<V, R> {
    replicas: Vec<Map<V, R>>,
    network: NetworkSimulator<SyncMessage<V>>,
}

impl<V, R> AntiEntropyCluster<V, R>
where
    V: Clone + PartialEq,
    R: ConflictResolver<V> + Clone,
{
    /// Create a cluster of `n` replicas named `replica_0` .. `replica_{n-1}`
    pub fn new(n: usize, resolver: R, config: NetworkConfig) -> Self {
        Self::with_ids((0..n).map(|i| format!("replica_{}", i)), resolver, config)
    }

    pub fn with_ids<I, S>(ids: I, resolver: R, config: NetworkConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replicas = ids
            .into_iter()
            .map(|id| {
                let id: String = id.into();
                Map::new(id, resolver.clone())
            })
            .collect();

        Self {
            replicas,
            network: NetworkSimulator::new(config),
        }
    }

    pub fn replica(&self, idx: usize) -> &Map<V, R> {
        &self.replicas[idx]
    }

    pub fn replica_mut(&mut self, idx: usize) -> &mut Map<V, R> {
        &mut self.replicas[idx]
    }

    /// Local write on one replica
    pub fn set(&mut self, idx: usize, key: impl Into<String>, value: V) {
        self.replicas[idx].set(key, value);
    }

    /// Have replica `requester` ask replica `producer` for a delta
    pub fn request_sync(&mut self, requester: usize, producer: usize) {
        let from = self.replicas[requester].id().clone();
        let to = self.replicas[producer].id().clone();
        let since = self.replicas[requester].version();
        self.network.send(SyncMessage::Request { from, to, since });
    }

    fn position(&self, id: &ReplicaId) -> Option<usize> {
        self.replicas.iter().position(|r| r.id() == id)
    }

    /// Deliver one network message. Returns false once the network is idle.
    pub fn process_one(&mut self) -> bool {
        let Some(msg) = self.network.receive() else {
            return false;
        };

        let Some(idx) = self.position(msg.to()) else {
            warn!(to = %msg.to(), "dropping message for unknown replica");
            return true;
        };

        match msg {
            SyncMessage::Request { from, to, since } => {
                let delta = self.replicas[idx].delta(&since);
                self.network.send(SyncMessage::Delta {
                    from: to,
                    to: from,
                    delta,
                });
            }
            SyncMessage::Delta { from, to, delta } => {
                let stats = self.replicas[idx].merge(delta);
                debug!(
                    %from,
                    %to,
                    adopted = stats.adopted,
                    conflicts = stats.conflicts,
                    skipped = stats.skipped,
                    "delivered delta"
                );
            }
        }
        true
    }

    /// Run until network is empty
    pub fn drain_network(&mut self) {
        while self.process_one() {}
    }

    /// Full sync: every replica pulls from every other replica
    pub fn full_sync_round(&mut self) {
        let n = self.replicas.len();
        for requester in 0..n {
            for producer in 0..n {
                if requester != producer {
                    self.request_sync(requester, producer);
                }
            }
        }
        self.drain_network();
    }

    /// Retransmit lost messages and process
    pub fn retransmit_and_process(&mut self) {
        self.network.retransmit_lost();
        self.drain_network();
    }

    /// All replicas hold the same records and the same version vector
    pub fn is_converged(&self) -> bool {
        let Some((first, rest)) = self.replicas.split_first() else {
            return true;
        };
        let records: Vec<&Record<V>> = first.records().collect();
        let version = first.version();

        rest.iter().all(|replica| {
            replica.version() == version && replica.records().eq(records.iter().copied())
        })
    }

    pub fn network(&self) -> &NetworkSimulator<SyncMessage<V>> {
        &self.network
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vvmap_core::GreatestValue;

    #[test]
    fn test_cluster_basic_convergence() {
        let mut cluster = AntiEntropyCluster::new(3, GreatestValue, NetworkConfig::default());

        cluster.set(0, "a", 1u32);
        cluster.set(1, "b", 2u32);
        assert!(!cluster.is_converged());

        cluster.full_sync_round();

        assert!(cluster.is_converged());
        for i in 0..3 {
            assert_eq!(cluster.replica(i).get("a"), Some(&1));
            assert_eq!(cluster.replica(i).get("b"), Some(&2));
        }
    }

    #[test]
    fn test_request_then_reply() {
        let mut cluster = AntiEntropyCluster::new(2, GreatestValue, NetworkConfig::default());
        cluster.set(1, "k", 5u32);

        cluster.request_sync(0, 1);
        assert_eq!(cluster.network().in_flight_count(), 1);

        // request arrives at replica_1, which answers with a delta
        assert!(cluster.process_one());
        assert_eq!(cluster.network().in_flight_count(), 1);
        assert_eq!(cluster.replica(0).get("k"), None);

        assert!(cluster.process_one());
        assert_eq!(cluster.replica(0).get("k"), Some(&5));
        assert!(!cluster.process_one());
    }

    #[test]
    fn test_convergence_under_loss() {
        let mut cluster = AntiEntropyCluster::new(3, GreatestValue, NetworkConfig::lossy(0.5));

        for i in 0..3 {
            cluster.set(i, format!("key_{}", i), i as u32);
        }

        let mut rounds = 0;
        while !cluster.is_converged() && rounds < 100 {
            cluster.full_sync_round();
            cluster.retransmit_and_process();
            rounds += 1;
        }

        assert!(cluster.is_converged(), "stuck after {} rounds", rounds);
        for i in 0..3 {
            assert_eq!(cluster.replica(i).len(), 3);
        }
    }

    #[test]
    fn test_idempotence_repeated_resends() {
        let mut cluster = AntiEntropyCluster::new(2, GreatestValue, NetworkConfig::with_dups(0.5));
        cluster.set(0, "k", 42u32);

        cluster.full_sync_round();
        let after_one = cluster.replica(1).version();

        for _ in 0..10 {
            cluster.full_sync_round();
        }

        assert_eq!(cluster.replica(1).version(), after_one);
        assert_eq!(cluster.replica(1).get("k"), Some(&42));
    }
}
