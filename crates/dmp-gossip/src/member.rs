use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;

/// A cluster peer as gossip knows it: a stable id, the address its bus
/// listens on, and a free-form tag set the layer above (§4.6 "Discovery")
/// projects into namespace/topic membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub addr: SocketAddr,
    pub tags: HashMap<String, String>,
}

/// Failure-detector state for a member (SWIM Alive/Suspect/Dead), carrying
/// an incarnation number so a member's own refutation of a false suspicion
/// always wins over a stale one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Alive { incarnation: u64 },
    Suspect { incarnation: u64 },
    Dead { incarnation: u64 },
}

impl MemberStatus {
    pub fn incarnation(&self) -> u64 {
        match self {
            MemberStatus::Alive { incarnation }
            | MemberStatus::Suspect { incarnation }
            | MemberStatus::Dead { incarnation } => *incarnation,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, MemberStatus::Alive { .. })
    }
}

/// Membership change notifications delivered to subscribers.
#[derive(Debug, Clone)]
pub enum GossipEvent {
    Joined(Member),
    Updated(Member),
    Left(String),
    Failed(String),
}
