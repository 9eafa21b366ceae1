//! chatd - multi-room WebSocket chat broker.
//!
//! Usage: `chatd [PORT]`. Settings beyond the port come from the TOML file
//! named by `CHATD_CONFIG`, if set.

use chatd::config::{self, Config};
use chatd::network::Gateway;
use chatd::state::Hub;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut config = Config::from_env().map_err(|e| {
        error!(error = %e, "Failed to load config");
        e
    })?;
    let port_arg = std::env::args().nth(1);
    config.apply_port_arg(port_arg.as_deref())?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid config");
        }
        anyhow::bail!("Refusing to start with {} config error(s)", errors.len());
    }

    if config.metrics.enabled {
        chatd::metrics::init();
    }

    info!(
        addr = %config.listen.socket_addr(),
        default_room = %config.chat.default_room,
        "Starting chatd"
    );

    let hub = Arc::new(Hub::new(config.chat.clone()));
    let gateway = Gateway::bind(config.listen.socket_addr(), hub, config.metrics.enabled).await?;

    gateway
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
}
