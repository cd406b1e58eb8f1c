use crate::service::Service;
use crate::sync_point::SyncPoint;
use crate::tags;
use dmp_errors::DmpError;
use dmp_gossip::{GossipCluster, MemberStatus};
use std::collections::HashMap;
use std::sync::Arc;

/// The namespace/topic service registry layered over cluster gossip
/// (§4.6 "Discovery"). Depends only on [`GossipCluster`], not on any
/// particular gossip implementation.
///
/// Grounded on `discovery/serf_discovery.go`'s `SerfDiscovery`.
pub struct Discovery {
    gossip: Arc<dyn GossipCluster>,
    sync_point: SyncPoint,
}

impl Discovery {
    pub fn new(gossip: Arc<dyn GossipCluster>, sync_point: SyncPoint) -> Self {
        Discovery { gossip, sync_point }
    }

    /// The gossip layer's own bound address, usable by other nodes as a
    /// contact point.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.gossip.local_member().addr
    }

    /// Explicit contact points, else a CIDR scan, else run alone. Returns
    /// how many contacts were actually dialed.
    pub async fn start(&self, comm_port: u16) -> Result<usize, DmpError> {
        if !self.sync_point.addresses.is_empty() {
            tracing::info!(contacts = ?self.sync_point.addresses, "joining via explicit contact points");
            self.gossip.join(&self.sync_point.addresses).await?;
            return Ok(self.sync_point.addresses.len());
        }

        let cidr_addrs = self.sync_point.cidr_addresses(comm_port)?;
        if !cidr_addrs.is_empty() {
            tracing::info!(count = cidr_addrs.len(), "joining via CIDR scan");
            self.gossip.join(&cidr_addrs).await?;
            return Ok(cidr_addrs.len());
        }

        tracing::info!("no contact points found, running alone in cluster");
        Ok(0)
    }

    /// Leave the cluster, then shut the gossip engine down (§9 design
    /// note: "Stop with Leave-then-Shutdown").
    pub async fn stop(&self) -> Result<(), DmpError> {
        self.gossip.leave().await?;
        self.gossip.stop();
        Ok(())
    }

    pub async fn register(&self, namespace: &str, comm_port: u16) -> Result<(), DmpError> {
        let existing_topics = self
            .read_local_service()
            .await
            .map(|service| service.topics)
            .unwrap_or_default();
        let tags = tags::service_tags(namespace, comm_port, &existing_topics);
        self.gossip.set_tags(tags).await;
        Ok(())
    }

    pub async fn update(&self, namespace: &str, comm_port: u16) -> Result<(), DmpError> {
        let existing_topics = self
            .read_local_service()
            .await
            .map(|service| service.topics)
            .unwrap_or_default();
        let tags = tags::service_tags(namespace, comm_port, &existing_topics);
        self.gossip.set_tags(tags).await;
        Ok(())
    }

    pub async fn unregister(&self) -> Result<(), DmpError> {
        self.gossip.set_tags(HashMap::new()).await;
        Ok(())
    }

    pub async fn subscribe_topic(&self, topic: &str) -> Result<(), DmpError> {
        let mut service = self
            .read_local_service()
            .await
            .ok_or_else(|| DmpError::Discovery("cannot subscribe before register".into()))?;
        service.subscribe(topic);
        let tags = tags::service_tags(&service.namespace, service.comm_port, &service.topics);
        self.gossip.set_tags(tags).await;
        Ok(())
    }

    pub async fn unsubscribe_topic(&self, topic: &str) -> Result<(), DmpError> {
        let mut service = self
            .read_local_service()
            .await
            .ok_or_else(|| DmpError::Discovery("cannot unsubscribe before register".into()))?;
        service.unsubscribe(topic);
        let tags = tags::service_tags(&service.namespace, service.comm_port, &service.topics);
        self.gossip.set_tags(tags).await;
        Ok(())
    }

    /// This node's own registration, projected from its own gossip tags.
    /// The local member is always considered alive to itself.
    pub async fn read_local_service(&self) -> Option<Service> {
        let member = self.gossip.local_member();
        tags::member_to_service(&member, &MemberStatus::Alive { incarnation: 0 })
    }

    /// Every namespaced peer, regardless of failure-detector status (§9
    /// open question: kept deliberately asymmetric with [`Discovery::read_ns`]
    /// and friends, which only ever return alive services — that mirrors
    /// `discovery/serf_discovery.go`, where `ReadAll` walks every known
    /// member unfiltered while `ReadNS`/`ReadMultiNS`/`ReadSubscriber` call
    /// `readServiceAlive`).
    pub async fn read_all(&self) -> Vec<Service> {
        self.gossip
            .members()
            .await
            .iter()
            .filter_map(|(member, status)| tags::member_to_service(member, status))
            .collect()
    }

    pub async fn read_ns(&self, namespace: &str) -> Vec<Service> {
        self.read_alive_matching(|service| service.namespace == namespace)
            .await
            .remove(namespace)
            .unwrap_or_default()
    }

    pub async fn read_multi_ns(&self, namespaces: &[String]) -> HashMap<String, Vec<Service>> {
        self.read_alive_matching(|service| namespaces.iter().any(|ns| ns == &service.namespace))
            .await
    }

    pub async fn read_subscriber(&self, topic: &str) -> HashMap<String, Vec<Service>> {
        self.read_alive_matching(|service| service.topics.contains(topic)).await
    }

    async fn read_alive_matching(&self, matches: impl Fn(&Service) -> bool) -> HashMap<String, Vec<Service>> {
        let mut grouped: HashMap<String, Vec<Service>> = HashMap::new();
        for (member, status) in self.gossip.members().await {
            if !status.is_alive() {
                continue;
            }
            if let Some(service) = tags::member_to_service(&member, &status)
                && matches(&service)
            {
                grouped.entry(service.namespace.clone()).or_default().push(service);
            }
        }
        grouped
    }
}
