use crate::member::{GossipEvent, Member, MemberStatus};
use crate::protocol::{self, GossipMessage};
use async_trait::async_trait;
use dmp_errors::DmpError;
use rand::Rng;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::RwLock as StdRwLock;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::time::interval;

/// Tuning for the failure detector and gossip cadence.
#[derive(Debug, Clone)]
pub struct GossipConfig {
    pub gossip_interval: Duration,
    pub failure_timeout: Duration,
}

impl Default for GossipConfig {
    fn default() -> Self {
        GossipConfig {
            gossip_interval: Duration::from_millis(500),
            failure_timeout: Duration::from_secs(3),
        }
    }
}

/// The capability `dmp-discovery` depends on: join a cluster, observe its
/// membership, and advertise local tags, without knowing this is SWIM
/// underneath (§9 design note: "the adapter depends only on that
/// capability").
#[async_trait]
pub trait GossipCluster: Send + Sync {
    fn local_member(&self) -> Member;
    async fn set_tags(&self, tags: HashMap<String, String>);
    async fn join(&self, seeds: &[SocketAddr]) -> Result<(), DmpError>;
    async fn leave(&self) -> Result<(), DmpError>;
    async fn members(&self) -> Vec<(Member, MemberStatus)>;
    fn subscribe(&self) -> broadcast::Receiver<GossipEvent>;
    fn stop(&self);
}

struct GossipState {
    members: HashMap<String, (Member, MemberStatus)>,
    pending_acks: HashMap<u64, (String, Instant)>,
    suspected_since: HashMap<String, Instant>,
    sequence: u64,
}

impl GossipState {
    fn new() -> Self {
        GossipState {
            members: HashMap::new(),
            pending_acks: HashMap::new(),
            suspected_since: HashMap::new(),
            sequence: 0,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// SWIM-style UDP gossip: periodic ping/ack with a piggybacked membership
/// table, suspicion before a member is declared dead.
///
/// Grounded on the SWIM sketch in the broader corpus (ping, ack, ping-req,
/// join/leave, an incarnation number that lets a node's own refutation
/// override a stale suspicion). Adapted from a single-process membership
/// table keyed by node id to the free-form tag set DMP's discovery layer
/// projects into namespace/topic membership.
pub struct SwimGossip {
    local: StdRwLock<Member>,
    socket: Arc<UdpSocket>,
    state: RwLock<GossipState>,
    events: broadcast::Sender<GossipEvent>,
    shutdown_tx: watch::Sender<bool>,
    config: GossipConfig,
}

impl SwimGossip {
    /// Bind a UDP socket and spawn the gossip loop. The returned handle is
    /// already running; callers still need to `join` a seed or two to
    /// actually discover peers.
    pub async fn bind(id: String, bind_addr: SocketAddr, config: GossipConfig) -> Result<Arc<Self>, DmpError> {
        let socket = UdpSocket::bind(bind_addr).await?;
        let local_addr = socket.local_addr()?;
        let local = Member {
            id,
            addr: local_addr,
            tags: HashMap::new(),
        };
        let (events, _rx) = broadcast::channel(1024);
        let (shutdown_tx, _rx) = watch::channel(false);

        let gossip = Arc::new(SwimGossip {
            local: StdRwLock::new(local),
            socket: Arc::new(socket),
            state: RwLock::new(GossipState::new()),
            events,
            shutdown_tx,
            config,
        });

        let task = Arc::clone(&gossip);
        tokio::spawn(async move { task.run().await });

        Ok(gossip)
    }

    async fn send_message(&self, msg: &GossipMessage, addr: SocketAddr) -> Result<(), DmpError> {
        let bytes = protocol::encode(msg)?;
        self.socket.send_to(&bytes, addr).await?;
        Ok(())
    }

    async fn send_ping(&self) -> Result<(), DmpError> {
        let target = {
            let state = self.state.read().await;
            let alive: Vec<(String, SocketAddr)> = state
                .members
                .values()
                .filter(|(_, status)| status.is_alive())
                .map(|(member, _)| (member.id.clone(), member.addr))
                .collect();
            if alive.is_empty() {
                return Ok(());
            }
            alive[rand::rng().random_range(0..alive.len())].clone()
        };
        let (target_id, target_addr) = target;

        let sequence = {
            let mut state = self.state.write().await;
            let seq = state.next_sequence();
            state.pending_acks.insert(seq, (target_id, Instant::now()));
            seq
        };

        let from = self.local_member();
        self.send_message(&GossipMessage::Ping { from, sequence }, target_addr).await
    }

    async fn handle_message(&self, msg: GossipMessage, from_addr: SocketAddr) -> Result<(), DmpError> {
        match msg {
            GossipMessage::Ping { from, sequence } => {
                let local = self.local_member();
                self.send_message(&GossipMessage::Ack { from: local, sequence }, from_addr)
                    .await?;
                self.update_member(from, MemberStatus::Alive { incarnation: 0 }).await;
            }
            GossipMessage::Ack { from, sequence } => {
                self.state.write().await.pending_acks.remove(&sequence);
                self.update_member(from, MemberStatus::Alive { incarnation: 0 }).await;
            }
            GossipMessage::PingReq { target, sequence, .. } => {
                let local = self.local_member();
                self.send_message(&GossipMessage::Ping { from: local, sequence }, target).await?;
            }
            GossipMessage::Update { member, status } => {
                self.update_member(member, status).await;
            }
            GossipMessage::Join { member } => {
                self.update_member(member.clone(), MemberStatus::Alive { incarnation: 0 }).await;
                let _ = self.events.send(GossipEvent::Joined(member));
            }
            GossipMessage::Leave { id } => {
                self.state.write().await.members.remove(&id);
                let _ = self.events.send(GossipEvent::Left(id));
            }
        }
        Ok(())
    }

    /// Apply an incoming status if its incarnation is at least as new as
    /// what we already have, matching SWIM's rule that a higher
    /// incarnation (typically the member refuting its own suspicion) wins.
    async fn update_member(&self, member: Member, status: MemberStatus) {
        let mut state = self.state.write().await;
        let should_update = match state.members.get(&member.id) {
            Some((_, existing)) => status.incarnation() >= existing.incarnation(),
            None => true,
        };

        if should_update {
            if status.is_alive() {
                state.suspected_since.remove(&member.id);
            }
            state.members.insert(member.id.clone(), (member.clone(), status));
            drop(state);
            let _ = self.events.send(GossipEvent::Updated(member));
        }
    }

    /// Time out stale pending acks (marking their target Suspect) and
    /// promote members that have stayed Suspect past the failure window to
    /// Dead. Each member fires exactly one `Failed` event, at the moment
    /// it is first declared Dead.
    async fn check_failures(&self) {
        let now = Instant::now();
        let timeout = self.config.failure_timeout;

        let mut state = self.state.write().await;

        let timed_out: Vec<String> = state
            .pending_acks
            .iter()
            .filter(|(_, (_, sent_at))| now.duration_since(*sent_at) > timeout)
            .map(|(_, (id, _))| id.clone())
            .collect();
        state
            .pending_acks
            .retain(|_, (_, sent_at)| now.duration_since(*sent_at) <= timeout);

        for id in timed_out {
            if let Some((_, status)) = state.members.get_mut(&id)
                && status.is_alive()
            {
                *status = MemberStatus::Suspect { incarnation: status.incarnation() };
                state.suspected_since.entry(id).or_insert(now);
            }
        }

        let newly_dead: Vec<(String, Member)> = state
            .suspected_since
            .iter()
            .filter(|(_, since)| now.duration_since(**since) > timeout * 3)
            .filter_map(|(id, _)| state.members.get(id).map(|(member, _)| (id.clone(), member.clone())))
            .collect();

        for (id, member) in &newly_dead {
            state.suspected_since.remove(id);
            state
                .members
                .insert(id.clone(), (member.clone(), MemberStatus::Dead { incarnation: 0 }));
        }
        drop(state);

        for (id, _) in newly_dead {
            let _ = self.events.send(GossipEvent::Failed(id));
        }
    }

    async fn run(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = interval(self.config.gossip_interval);
        let mut buf = vec![0u8; 65536];

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.send_ping().await {
                        tracing::warn!(%err, "gossip ping failed");
                    }
                    self.check_failures().await;
                }
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, addr)) => match protocol::decode(&buf[..len]) {
                            Ok(msg) => {
                                if let Err(err) = self.handle_message(msg, addr).await {
                                    tracing::warn!(%err, "gossip message handling failed");
                                }
                            }
                            Err(err) => tracing::warn!(%err, "dropping malformed gossip datagram"),
                        },
                        Err(err) => {
                            tracing::error!(%err, "gossip socket recv failed");
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl GossipCluster for SwimGossip {
    fn local_member(&self) -> Member {
        self.local.read().unwrap().clone()
    }

    async fn set_tags(&self, tags: HashMap<String, String>) {
        self.local.write().unwrap().tags = tags;
    }

    async fn join(&self, seeds: &[SocketAddr]) -> Result<(), DmpError> {
        let member = self.local_member();
        for seed in seeds {
            self.send_message(&GossipMessage::Join { member: member.clone() }, *seed)
                .await?;
        }
        Ok(())
    }

    async fn leave(&self) -> Result<(), DmpError> {
        let id = self.local_member().id;
        let targets: Vec<SocketAddr> = self
            .state
            .read()
            .await
            .members
            .values()
            .filter(|(_, status)| status.is_alive())
            .map(|(member, _)| member.addr)
            .collect();

        for addr in targets {
            self.send_message(&GossipMessage::Leave { id: id.clone() }, addr).await?;
        }
        Ok(())
    }

    async fn members(&self) -> Vec<(Member, MemberStatus)> {
        self.state.read().await.members.values().cloned().collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<GossipEvent> {
        self.events.subscribe()
    }

    fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
