use stress_test::{stress_test_greatest_value, stress_test_highest_dot, stress_test_scaling, StressConfig};
use tracing_subscriber::EnvFilter;
use vvmap_core::{Map, Record};
use vvmap_sync::{AntiEntropyCluster, NetworkConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    demo_lunch();
    demo_lossy_cluster();

    let rt = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    rt.block_on(async_main());
}

/// Three replicas order lunch at the same time and settle on one answer.
fn demo_lunch() {
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║  Demo 1: Concurrent writes to one key                      ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // choose left if lexicographically greater
    let lexicographic = |_: &str, left: &Record<String>, right: &Record<String>| left.value > right.value;

    let mut alice = Map::new("alice", lexicographic);
    let mut bob = Map::new("bob", lexicographic);
    let mut tim = Map::new("tim", lexicographic);

    alice.set("lunch", "turkey".to_string());
    bob.set("lunch", "ham".to_string());
    tim.set("lunch", "chicken".to_string());

    alice.merge(bob.delta(&alice.version()));
    alice.merge(tim.delta(&alice.version()));
    bob.merge(alice.delta(&bob.version()));
    tim.merge(alice.delta(&tim.version()));

    for map in [&alice, &bob, &tim] {
        println!("  {}: {:?} at {}", map.id(), map.get("lunch"), map.version());
    }
}

/// Gossip over a network that drops, duplicates and reorders messages.
fn demo_lossy_cluster() {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║  Demo 2: Anti-entropy on a chaotic network                 ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let mut cluster = AntiEntropyCluster::new(4, vvmap_core::HighestDot, NetworkConfig::chaotic());
    for i in 0..4 {
        cluster.set(i, "leader", format!("replica_{}", i));
        cluster.set(i, format!("heartbeat_{}", i), format!("{}", i * 10));
    }

    let mut rounds = 0;
    while !cluster.is_converged() && rounds < 20 {
        cluster.full_sync_round();
        cluster.retransmit_and_process();
        rounds += 1;
    }

    println!("  Converged after {} rounds", rounds);
    println!("  Keys: {:?}", cluster.replica(0).keys());
    println!("  Leader: {:?}", cluster.replica(0).get("leader"));
}

async fn async_main() {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            ASYNC STRESS TESTS                              ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let small = StressConfig::default();
    stress_test_greatest_value(&small).await.print();
    stress_test_highest_dot(&small).await.print();

    let medium = StressConfig {
        num_replicas: 10,
        ops_per_replica: 500,
        num_syncs: 1000,
        key_space: 64,
    };
    stress_test_greatest_value(&medium).await.print();
    stress_test_highest_dot(&medium).await.print();

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS (HighestDot)                     ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(20, 2).await;

    println!("\n✓ All stress tests completed successfully!");
}
