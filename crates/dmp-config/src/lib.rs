//! Node configuration loading (§10.4 / `[AMBIENT]`).
//!
//! TOML is the sole config source, the same raw-then-validated two-struct
//! pattern as `forwarder::config`: a `RawConfig` with every field optional
//! is deserialized first, then defaults are applied and the result is
//! packed into a validated [`NodeConfig`]. Grounded on `dmp/config.go`'s
//! `Config` (node name, bind addr/port, network profile, contact points,
//! contact CIDR, namespace, net interface) merged with `discovery/config.go`'s
//! `Config` (addr + network profile for the gossip layer).

use dmp_errors::DmpError;
use serde::Deserialize;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

/// Network profile passed through to the gossip layer. Carried from the
/// original for config-surface parity; the SWIM engine backing
/// [`dmp_discovery`] (see `[SUPPLEMENT] 11.1`) does not itself vary gossip
/// timing by profile, but a future gossip backend may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkType {
    #[default]
    Lan,
    Wan,
    Local,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkType::Lan => "lan",
            NetworkType::Wan => "wan",
            NetworkType::Local => "local",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for NetworkType {
    type Err = std::convert::Infallible;

    /// `dmp/config.go`'s `DiscoveryConfig` defaults any unrecognized value
    /// (including `"lan"`) to `LanNetwork`, so this never actually fails.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "wan" => NetworkType::Wan,
            "local" => NetworkType::Local,
            _ => NetworkType::Lan,
        })
    }
}

impl NetworkType {
    fn parse(raw: &str) -> NetworkType {
        raw.parse().unwrap_or(NetworkType::Lan)
    }
}

/// A validated node configuration (§10.4). The Rust analogue of
/// `dmp.Config` plus `discovery.Config`.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_name: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub network_type: NetworkType,
    pub contact_points: Vec<String>,
    pub contact_cidr: Option<String>,
    pub namespace: Option<String>,
    pub net_interface: Option<String>,
}

impl NodeConfig {
    /// `dmp/config.go`'s `DefaultConfig()`.
    pub fn default_config() -> NodeConfig {
        NodeConfig {
            node_name: String::new(),
            bind_addr: "0.0.0.0".to_owned(),
            bind_port: 7946,
            network_type: NetworkType::Lan,
            contact_points: Vec::new(),
            contact_cidr: None,
            namespace: None,
            net_interface: None,
        }
    }

    /// Fill every empty field of `self` from `other`. Mirrors `Config.Merge`
    /// exactly, including its asymmetry: `network_type` is never merged
    /// (the original never merges `NetworkType` either — see DESIGN.md).
    pub fn merge(&mut self, other: &NodeConfig) {
        if self.node_name.is_empty() {
            self.node_name = other.node_name.clone();
        }
        if self.bind_addr.is_empty() {
            self.bind_addr = other.bind_addr.clone();
        }
        if self.bind_port == 0 {
            self.bind_port = other.bind_port;
        }
        if self.contact_points.is_empty() {
            self.contact_points = other.contact_points.clone();
        }
        if self.contact_cidr.is_none() {
            self.contact_cidr = other.contact_cidr.clone();
        }
        if self.namespace.is_none() {
            self.namespace = other.namespace.clone();
        }
        if self.net_interface.is_none() {
            self.net_interface = other.net_interface.clone();
        }
    }

    /// The address the gossip layer should bind to, plus its network
    /// profile. Mirrors `Config.DiscoveryConfig`.
    pub fn discovery_bind_addr(&self) -> Result<SocketAddr, DmpError> {
        resolve_one(&format!("{}:{}", self.bind_addr, self.bind_port))
    }

    /// Every explicit contact point, resolved to a socket address.
    pub fn contact_addresses(&self) -> Result<Vec<SocketAddr>, DmpError> {
        self.contact_points.iter().map(|raw| resolve_one(raw)).collect()
    }

    /// The address to actually bind, honoring an optional network
    /// interface override. Mirrors `Config.GetBindAddr`.
    ///
    /// The original resolves `NetInterface` by enumerating the interface's
    /// addresses via `net.InterfaceByName`; Rust's standard library has no
    /// interface-enumeration API, and per `[SUPPLEMENT] 11.3` this stays
    /// std-only rather than pulling in a platform crate for the sake of a
    /// rarely-used option. A caller that wants a specific interface's
    /// address should pass it directly as `bind_addr` instead.
    pub fn get_bind_addr(&self) -> Result<String, DmpError> {
        match &self.net_interface {
            None => Ok(self.bind_addr.clone()),
            Some(iface) => Err(DmpError::InvalidArgument {
                name: "net_interface".to_owned(),
                value: format!(
                    "interface '{iface}' cannot be resolved to an address without a platform-specific \
                     crate; pass the interface's address directly as bind_addr instead"
                ),
            }),
        }
    }
}

fn resolve_one(raw: &str) -> Result<SocketAddr, DmpError> {
    raw.to_socket_addrs()
        .map_err(|err| DmpError::InvalidArgument {
            name: "address".to_owned(),
            value: format!("{raw}: {err}"),
        })?
        .next()
        .ok_or_else(|| DmpError::InvalidArgument {
            name: "address".to_owned(),
            value: format!("{raw}: did not resolve to any address"),
        })
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    node_name: Option<String>,
    bind_addr: Option<String>,
    bind_port: Option<u16>,
    network_type: Option<String>,
    contact_points: Option<Vec<String>>,
    contact_cidr: Option<String>,
    namespace: Option<String>,
    net_interface: Option<String>,
}

/// Load a [`NodeConfig`] from a TOML file, falling back to
/// [`NodeConfig::default_config`] for anything the file doesn't set.
pub fn load_config_from_path(path: &Path) -> Result<NodeConfig, ConfigError> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|err| ConfigError::Io(format!("reading config file '{}': {err}", path.display())))?;
    load_config_from_str(&toml_str)
}

/// Load a [`NodeConfig`] from a TOML string.
pub fn load_config_from_str(toml_str: &str) -> Result<NodeConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
    let defaults = NodeConfig::default_config();

    Ok(NodeConfig {
        node_name: raw.node_name.unwrap_or(defaults.node_name),
        bind_addr: raw.bind_addr.unwrap_or(defaults.bind_addr),
        bind_port: raw.bind_port.unwrap_or(defaults.bind_port),
        network_type: raw
            .network_type
            .as_deref()
            .map_or(defaults.network_type, NetworkType::parse),
        contact_points: raw.contact_points.unwrap_or_default(),
        contact_cidr: raw.contact_cidr,
        namespace: raw.namespace,
        net_interface: raw.net_interface,
    })
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(s) => write!(f, "IO error: {s}"),
            ConfigError::Parse(s) => write!(f, "parse error: {s}"),
        }
    }
}

impl std::error::Error for ConfigError {}
