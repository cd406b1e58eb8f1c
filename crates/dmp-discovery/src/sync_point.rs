use dmp_errors::DmpError;
use std::net::SocketAddr;

/// Where a freshly-started node looks for an existing cluster to join
/// (§4.6 "auto-join policy"): explicit contact addresses take priority
/// over a CIDR scan, which in turn only runs if no contacts were given.
///
/// Grounded on `discovery/serf_discovery.go`'s `SyncPoint`.
#[derive(Debug, Clone, Default)]
pub struct SyncPoint {
    pub addresses: Vec<SocketAddr>,
    pub cidr: Option<String>,
}

impl SyncPoint {
    pub fn new(addresses: Vec<SocketAddr>, cidr: Option<String>) -> Self {
        SyncPoint { addresses, cidr }
    }

    /// Every address in the configured CIDR block, on `port`. Empty if no
    /// CIDR was configured.
    pub fn cidr_addresses(&self, port: u16) -> Result<Vec<SocketAddr>, DmpError> {
        let Some(cidr) = &self.cidr else {
            return Ok(Vec::new());
        };

        let network: ipnetwork::IpNetwork = cidr
            .parse()
            .map_err(|err| DmpError::Discovery(format!("invalid CIDR '{cidr}': {err}")))?;

        Ok(network.iter().map(|ip| SocketAddr::new(ip, port)).collect())
    }
}
