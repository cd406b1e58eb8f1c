use crate::member::{Member, MemberStatus};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Messages exchanged between gossip peers over UDP.
///
/// Grounded on the `GossipMessage` enum of the SWIM sketch this crate is
/// built from: direct ping/ack, indirect ping-req, piggybacked status
/// updates, and explicit join/leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GossipMessage {
    Ping { from: Member, sequence: u64 },
    Ack { from: Member, sequence: u64 },
    PingReq { from: Member, target: SocketAddr, sequence: u64 },
    Update { member: Member, status: MemberStatus },
    Join { member: Member },
    Leave { id: String },
}

pub fn encode(msg: &GossipMessage) -> Result<Vec<u8>, dmp_errors::DmpError> {
    bincode::serde::encode_to_vec(msg, bincode::config::standard())
        .map_err(|err| dmp_errors::DmpError::Discovery(format!("gossip encode failed: {err}")))
}

pub fn decode(bytes: &[u8]) -> Result<GossipMessage, dmp_errors::DmpError> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(msg, _)| msg)
        .map_err(|err| dmp_errors::DmpError::Discovery(format!("gossip decode failed: {err}")))
}
