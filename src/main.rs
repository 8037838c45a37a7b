use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use asteroid_miner::config::RelayConfig;
use asteroid_miner::metrics::{self, RelayMetrics};
use asteroid_miner::net::Relay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Asteroid relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = RelayConfig::load_or_default();
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse::<u16>() {
            Ok(port) if port > 0 => config.port = port,
            _ => warn!("Invalid port argument '{}', using {}", arg, config.port),
        }
    }
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: {}:{}, broadcast={}ms, timeout={}ms",
        config.bind_address, config.port, config.broadcast_interval_ms, config.peer_timeout_ms
    );

    let metrics = Arc::new(RelayMetrics::new());
    if let Some(port) = config.metrics_port {
        let metrics = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(metrics, port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let relay = Relay::bind(config, metrics).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    relay.run(shutdown).await;
    info!("Relay stopped");

    Ok(())
}
