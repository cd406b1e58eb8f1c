//! Two gossip engines joining each other should converge on a shared,
//! mutually-alive membership view within a few gossip intervals.

use dmp_gossip::{GossipCluster, GossipConfig, SwimGossip};
use std::time::Duration;

fn fast_config() -> GossipConfig {
    GossipConfig {
        gossip_interval: Duration::from_millis(20),
        failure_timeout: Duration::from_millis(200),
    }
}

#[tokio::test]
async fn two_peers_see_each_other_after_join() {
    let a = SwimGossip::bind("node-a".into(), "127.0.0.1:0".parse().unwrap(), fast_config())
        .await
        .unwrap();
    let b = SwimGossip::bind("node-b".into(), "127.0.0.1:0".parse().unwrap(), fast_config())
        .await
        .unwrap();

    let addr_a = a.local_member().addr;
    let addr_b = b.local_member().addr;

    a.join(&[addr_b]).await.unwrap();
    b.join(&[addr_a]).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let members_seen_by_a = a.members().await;
    let members_seen_by_b = b.members().await;

    assert!(members_seen_by_a.iter().any(|(m, s)| m.id == "node-b" && s.is_alive()));
    assert!(members_seen_by_b.iter().any(|(m, s)| m.id == "node-a" && s.is_alive()));

    a.stop();
    b.stop();
}

#[tokio::test]
async fn leave_is_observed_as_a_left_event() {
    let a = SwimGossip::bind("leaver-a".into(), "127.0.0.1:0".parse().unwrap(), fast_config())
        .await
        .unwrap();
    let b = SwimGossip::bind("leaver-b".into(), "127.0.0.1:0".parse().unwrap(), fast_config())
        .await
        .unwrap();

    let addr_a = a.local_member().addr;
    let addr_b = b.local_member().addr;
    a.join(&[addr_b]).await.unwrap();
    b.join(&[addr_a]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    let mut events = b.subscribe();
    a.leave().await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("should observe a Left event promptly")
        .unwrap();
    assert!(matches!(event, dmp_gossip::GossipEvent::Left(id) if id == "leaver-a"));

    a.stop();
    b.stop();
}
