//! The `Dmp` facade (§4.1 "Node"): owns every long-lived piece of a
//! running node and sequences their startup and shutdown.
//!
//! Grounded on `dmp/dmp.go`'s `DMP` type: `CreateDMP` wires discovery, the
//! comm bus, and the admin API together; `Start` brings discovery up
//! first, then spawns the bus and the API; `Stop` tears discovery down,
//! then the API, then the bus, in that exact order.

use dmp_api::{ApiHandle, ApiServer};
use dmp_bus::{Bus, DEFAULT_COMM_PORT};
use dmp_config::NodeConfig;
use dmp_discovery::{Discovery, SyncPoint};
use dmp_errors::DmpError;
use dmp_gossip::{GossipConfig, SwimGossip};
use dmp_router::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// The public HTTP admin/data-plane port (`api/api.go`'s `:8080`).
pub const DEFAULT_API_PORT: u16 = 8080;

/// A fully wired, not-yet-started node.
pub struct Dmp {
    discovery: Arc<Discovery>,
    bus: Arc<Bus<Arc<Router>>>,
    router: Arc<Router>,
    api: Option<ApiServer>,
    api_addr: SocketAddr,
    api_handle: ApiHandle,
    bind_addr: String,
}

impl Dmp {
    /// Wire discovery, the comm bus, the router, and the admin API
    /// together. Nothing is listening or gossiping yet; call
    /// [`Dmp::start`] for that.
    pub async fn create(conf: &NodeConfig) -> Result<Self, DmpError> {
        let node_name = if conf.node_name.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            conf.node_name.clone()
        };

        let gossip_addr = conf.discovery_bind_addr()?;
        let gossip = SwimGossip::bind(node_name, gossip_addr, GossipConfig::default()).await?;

        let sync_point = SyncPoint::new(conf.contact_addresses()?, conf.contact_cidr.clone());
        let discovery = Arc::new(Discovery::new(gossip, sync_point));

        let router = Arc::new(Router::new(Arc::clone(&discovery)));

        let comm_addr: SocketAddr = format!("{}:{DEFAULT_COMM_PORT}", conf.bind_addr)
            .parse()
            .map_err(|err| DmpError::InvalidArgument {
                name: "bind_addr".to_owned(),
                value: format!("{}: {err}", conf.bind_addr),
            })?;
        let bus = Arc::new(Bus::bind(comm_addr, Arc::clone(&router)).await?);
        router.set_bus_port(bus.local_addr()?.port());

        let api_addr: SocketAddr = format!("{}:{DEFAULT_API_PORT}", conf.bind_addr)
            .parse()
            .map_err(|err| DmpError::InvalidArgument {
                name: "bind_addr".to_owned(),
                value: format!("{}: {err}", conf.bind_addr),
            })?;
        let (api, api_handle) = ApiServer::bind(api_addr, Arc::clone(&router)).await?;
        let api_addr = api.local_addr();

        Ok(Dmp {
            discovery,
            bus,
            router,
            api: Some(api),
            api_addr,
            api_handle,
            bind_addr: conf.bind_addr.clone(),
        })
    }

    pub fn comm_addr(&self) -> std::io::Result<SocketAddr> {
        self.bus.local_addr()
    }

    pub fn api_addr(&self) -> SocketAddr {
        self.api_addr
    }

    /// This node's gossip address, usable as a `contacts` entry for
    /// another node joining the same cluster.
    pub fn discovery_addr(&self) -> SocketAddr {
        self.discovery.local_addr()
    }

    /// Bring discovery up, then spawn the comm bus and the admin API as
    /// background tasks. Matches `DMP.Start`'s ordering.
    pub async fn start(&mut self) -> Result<(), DmpError> {
        let comm_port = self.bus.local_addr()?.port();
        let joined = self.discovery.start(comm_port).await?;
        tracing::info!(joined, bind_addr = %self.bind_addr, "discovery running");

        let bus = Arc::clone(&self.bus);
        tokio::spawn(async move { bus.run().await });
        tracing::info!("communication bus running");

        let api = self.api.take().expect("start must only be called once");
        tokio::spawn(api.run());
        tracing::info!("public API running");

        tracing::info!("DMP is running");
        Ok(())
    }

    /// Leave the cluster, stop answering API requests, then abort every
    /// in-flight bus connection. Matches `DMP.Stop`'s ordering; a failure
    /// to stop one component does not prevent attempting the others (§9
    /// "Router lifecycle").
    pub async fn stop(&self) -> Result<(), DmpError> {
        let discovery_result = self.discovery.stop().await;
        self.api_handle.stop();
        self.bus.stop();
        discovery_result
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}
