use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::loader::{load_config, override_port, port_from_env};
use edge_gateway::config::GatewayConfig;
use edge_gateway::http::GatewayServer;
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::observability::{logging, metrics};

/// Edge API gateway: routes inbound traffic to backend services.
#[derive(Parser)]
#[command(name = "edge-gateway", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listening port, overriding config and the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability.log_level);

    if let Some(port) = cli.port.or_else(port_from_env) {
        override_port(&mut config, port);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Gateway is running");

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
