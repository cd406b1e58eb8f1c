use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

/// A namespace's advertised health (§4.6 "Service").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Alive,
    Suspect,
    Fail,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceStatus::Alive => "Alive",
            ServiceStatus::Suspect => "Suspect",
            ServiceStatus::Fail => "Out of service",
        };
        write!(f, "{name}")
    }
}

/// A peer's routable identity plus the namespace/topics it has
/// registered, projected from its gossip tags.
///
/// Grounded on `discovery/service.go`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub namespace: String,
    pub ip: IpAddr,
    pub comm_port: u16,
    pub topics: HashSet<String>,
    pub status: ServiceStatus,
}

impl Service {
    pub fn new(namespace: String, ip: IpAddr, comm_port: u16, status: ServiceStatus) -> Self {
        Service {
            namespace,
            ip,
            comm_port,
            topics: HashSet::new(),
            status,
        }
    }

    pub fn comm_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.comm_port)
    }

    pub fn subscribe(&mut self, topic: &str) {
        self.topics.insert(topic.to_string());
    }

    pub fn unsubscribe(&mut self, topic: &str) {
        self.topics.remove(topic);
    }
}
