use clap::Parser;
use pkg_api::AppState;
use pkg_api::server::{ServerConfig, start_server};
use pkg_constants::paths::DEFAULT_SERVER_CONFIG;
use pkg_constants::runtime::{DEFAULT_NAMESPACE, DEFAULT_PORT};
use pkg_runtime::docker::{DockerBackend, DockerBackendConfig};
use pkg_runtime::{DeploymentBackend, SystemCapacity};
use pkg_types::config::{ServerConfigFile, load_config_file};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "wharf-server", about = "wharf deployment control plane")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_SERVER_CONFIG)]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// System namespace written into deployment labels
    #[arg(long)]
    namespace: Option<String>,

    /// Host path prefix for deployment data (switches volumes to binds)
    #[arg(long)]
    host_data_root: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: ServerConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let port = cli.port.or(file_cfg.port).unwrap_or(DEFAULT_PORT);
    let namespace = cli
        .namespace
        .or(file_cfg.namespace)
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let host_data_root = cli.host_data_root.or(file_cfg.host_data_root);

    info!("Starting wharf-server");
    info!("  Port:       {}", port);
    info!("  Namespace:  {}", namespace);
    info!(
        "  Data root:  {}",
        host_data_root.as_deref().unwrap_or("(named volumes)")
    );

    let capacity = SystemCapacity::detect();
    let backend = DockerBackend::connect(
        capacity,
        DockerBackendConfig {
            namespace,
            host_data_root,
        },
    )
    .await?;
    info!("Deployment backend: {}", backend.name());

    let state = AppState {
        backend: Arc::new(backend),
    };
    let config = ServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
    };

    start_server(config, state).await?;

    Ok(())
}
