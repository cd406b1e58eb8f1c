//! A self-contained SWIM-style UDP gossip engine, and the `GossipCluster`
//! capability trait `dmp-discovery` is built against (§9 design note:
//! the adapter depends only on that capability, not on gossip internals).

mod engine;
mod member;
mod protocol;

pub use engine::{GossipCluster, GossipConfig, SwimGossip};
pub use member::{GossipEvent, Member, MemberStatus};
