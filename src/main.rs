use clap::Parser;
use dmp::Dmp;
use dmp_config::NodeConfig;
use std::process::ExitCode;

/// Run a decentralized message bus node.
#[derive(Debug, Parser)]
#[command(name = "DMP", version, about = "run decentralized message bus")]
struct Cli {
    /// Node's name
    #[arg(short = 'n', long = "name", default_value = "")]
    name: String,

    /// Address for bind service discovery
    #[arg(long = "bind-host", visible_alias = "host", default_value = "0.0.0.0")]
    bind_host: String,

    /// Port for bind service discovery
    #[arg(long = "bind-port", visible_alias = "port", default_value_t = 7946)]
    bind_port: u16,

    /// Type of network to adjust config to suit (default lan)
    #[arg(long = "network", visible_alias = "net")]
    network: Option<NetworkTypeArg>,

    /// Specific address of an existing node in the cluster to join
    #[arg(short = 'c', long = "contacts")]
    contacts: Vec<String>,

    /// CIDR to join the cluster over
    #[arg(long = "contact-cidr", visible_alias = "cidr")]
    contact_cidr: Option<String>,

    /// Namespace
    #[arg(long = "namespace", visible_alias = "ns", default_value = "default")]
    namespace: String,

    /// Network interface
    #[arg(long = "net-if")]
    net_if: Option<String>,
}

/// Thin newtype so clap can parse `--network` straight into
/// [`dmp_config::NetworkType`] via its `FromStr` impl.
#[derive(Debug, Clone, Copy)]
struct NetworkTypeArg(dmp_config::NetworkType);

impl std::str::FromStr for NetworkTypeArg {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.parse().map(NetworkTypeArg)
    }
}

impl Cli {
    fn into_config(self) -> NodeConfig {
        let mut conf = NodeConfig {
            node_name: self.name,
            bind_addr: self.bind_host,
            bind_port: self.bind_port,
            network_type: self.network.map_or_else(|| NodeConfig::default_config().network_type, |n| n.0),
            contact_points: self.contacts,
            contact_cidr: self.contact_cidr,
            namespace: Some(self.namespace),
            net_interface: self.net_if,
        };
        conf.merge(&NodeConfig::default_config());
        conf
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dmp-node starting");

    let cli = Cli::parse();
    let mut conf = cli.into_config();

    if conf.bind_addr == "0.0.0.0"
        && conf.net_interface.is_some()
        && let Err(err) = conf.get_bind_addr().map(|addr| conf.bind_addr = addr)
    {
        tracing::error!(%err, "failed to resolve bind interface");
        return ExitCode::FAILURE;
    }

    let mut node = match Dmp::create(&conf).await {
        Ok(node) => node,
        Err(err) => {
            tracing::error!(%err, "failed to create node");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = node.start().await {
        tracing::error!(%err, "failed to start node");
        return ExitCode::FAILURE;
    }

    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to listen for ctrl-c, shutting down anyway");
    }
    tracing::info!("received shutdown signal");

    if let Err(err) = node.stop().await {
        tracing::error!(%err, "error while stopping node");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
