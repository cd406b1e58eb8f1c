//! The DMP facade (§4.8 "Router"): glues incoming API requests to
//! Discovery + Balance + Sender.
//!
//! Grounded on `dmp/dmp.go`'s `DMP` type. The lifecycle orchestration
//! (`Start`/`Stop` across discovery, the comm bus, and the admin API) stays
//! with the top-level binary crate, exactly as `dmp.go`'s `CreateDMP` lived
//! in the top `dmp` package rather than in `comm`/`discovery` — here that's
//! `src/lib.rs`, not this crate. `Router` only ever holds what a request
//! handler needs: discovery, the balancer, and a way to dial peers.

use async_trait::async_trait;
use dmp_balance::Balance;
use dmp_discovery::{Discovery, Service};
use dmp_errors::DmpError;
use dmp_sender::{DialKind, Sender};
use std::sync::Arc;
use std::sync::OnceLock;
use tokio::sync::RwLock;

pub struct Router {
    discovery: Arc<Discovery>,
    balance: Balance,
    bus_port: OnceLock<u16>,
    contact_point: RwLock<Option<String>>,
    http: reqwest::Client,
}

impl Router {
    pub fn new(discovery: Arc<Discovery>) -> Self {
        Router {
            discovery,
            balance: Balance::new(),
            bus_port: OnceLock::new(),
            contact_point: RwLock::new(None),
            http: reqwest::Client::new(),
        }
    }

    /// Record the comm bus's actual bound port once it's known (after
    /// `Bus::bind`, which may have retried onto an ephemeral port).
    pub fn set_bus_port(&self, port: u16) {
        let _ = self.bus_port.set(port);
    }

    fn bus_port(&self) -> u16 {
        *self
            .bus_port
            .get()
            .expect("set_bus_port must be called before any registration request")
    }

    /// `DMP.ServiceRegister`.
    pub async fn service_register(&self, namespace: &str, contact_point: String) -> Result<Service, DmpError> {
        self.discovery.register(namespace, self.bus_port()).await?;
        *self.contact_point.write().await = Some(contact_point);
        self.discovery
            .read_local_service()
            .await
            .ok_or_else(|| DmpError::Discovery("register succeeded but no local service was found".into()))
    }

    /// `DMP.ServiceUnregister`.
    pub async fn service_unregister(&self) -> bool {
        self.discovery.unregister().await.is_ok()
    }

    /// `DMP.SubscribeTopic`.
    pub async fn subscribe_topic(&self, topic: &str) -> bool {
        self.discovery.subscribe_topic(topic).await.is_ok()
    }

    /// `DMP.UnsubscribeTopic`.
    pub async fn unsubscribe_topic(&self, topic: &str) -> bool {
        self.discovery.unsubscribe_topic(topic).await.is_ok()
    }

    pub async fn list_members(&self, namespace: &str) -> Vec<Service> {
        self.discovery.read_ns(namespace).await
    }

    pub async fn list_all_members(&self) -> Vec<Service> {
        self.discovery.read_all().await
    }

    /// `DMP.Request`: unicast sync request/response.
    pub async fn request(&self, namespace: &str, msg: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        let services = self.discovery.read_ns(namespace).await;
        let service = self
            .balance
            .dispatch(namespace, &services)
            .ok_or_else(|| DmpError::NamespaceNotFound { namespace: namespace.to_owned() })?;

        let mut sender = Sender::dial(service.comm_addr(), DialKind::Sync).await?;
        let result = async {
            sender.send(msg).await?;
            sender.recv().await
        }
        .await;
        let _ = sender.close().await;
        result
    }

    /// `DMP.Publish`: fan out to exactly one dispatched peer per
    /// namespace subscribed to `topic`. Returns the literal `"send"` body,
    /// matching the original.
    pub async fn publish(&self, topic: &str, msg: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        let grouped = self.discovery.read_subscriber(topic).await;

        let mut addrs = Vec::new();
        for (ns, services) in &grouped {
            if let Some(service) = self.balance.dispatch(ns, services) {
                addrs.push(service.comm_addr());
            }
        }

        if addrs.is_empty() {
            return Err(DmpError::TopicHasNoSubscribers { topic: topic.to_owned() });
        }

        let mut sender = Sender::multi_dial(&addrs).await?;
        let result = sender.send(msg).await;
        let _ = sender.close().await;
        result?;
        Ok(b"send".to_vec())
    }

    /// `DMP.Notificate`: unicast async fire, then read the peer's ack.
    pub async fn notificate(&self, namespace: &str, msg: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        let services = self.discovery.read_ns(namespace).await;
        let service = self
            .balance
            .dispatch(namespace, &services)
            .ok_or_else(|| DmpError::NamespaceNotFound { namespace: namespace.to_owned() })?;

        let mut sender = Sender::dial(service.comm_addr(), DialKind::Async).await?;
        let result = async {
            sender.send(msg).await?;
            sender.recv().await
        }
        .await;
        let _ = sender.close().await;
        result
    }
}

/// `DMP.Recv`: the comm bus hands every inbound request to this, and it
/// forwards the raw payload to the registered local service over HTTP.
#[async_trait]
impl dmp_bus::Handler for Router {
    async fn recv(&self, body: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        let contact_point = self
            .contact_point
            .read()
            .await
            .clone()
            .ok_or_else(|| DmpError::Discovery("no contact point registered for this node".into()))?;

        let response = self
            .http
            .put(&contact_point)
            .body(body)
            .send()
            .await
            .map_err(|err| DmpError::Discovery(format!("contact point request failed: {err}")))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|err| DmpError::Discovery(format!("reading contact point response failed: {err}")))?;

        Ok(bytes.to_vec())
    }
}
