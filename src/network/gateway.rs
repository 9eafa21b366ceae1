//! Gateway - HTTP listener that serves the chat socket and probes.
//!
//! One port carries everything:
//!
//! - `GET /chat`    WebSocket upgrade, one [`Connection`] task per client
//! - `GET /health`  liveness JSON
//! - `GET /metrics` Prometheus text (when enabled)

use crate::http::{health_handler, metrics_handler};
use crate::network::Connection;
use crate::state::Hub;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// The Gateway accepts incoming connections and routes them.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
    metrics_enabled: bool,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, hub: Arc<Hub>, metrics_enabled: bool) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Chat listener bound");
        Ok(Self {
            listener,
            hub,
            metrics_enabled,
        })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Build the router without binding anything.
    pub fn router(hub: Arc<Hub>, metrics_enabled: bool) -> Router {
        let router = Router::new()
            .route("/chat", get(chat_handler))
            .route("/health", get(health_handler));
        let router = if metrics_enabled {
            router.route("/metrics", get(metrics_handler))
        } else {
            router
        };
        router.with_state(hub)
    }

    /// Run the gateway, accepting connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the gateway until `shutdown` resolves.
    ///
    /// Stops accepting at once; open sockets are left to their own tasks.
    #[instrument(skip_all, name = "gateway")]
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Self::router(self.hub, self.metrics_enabled);
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;
        info!("Gateway stopped");
        Ok(())
    }
}

/// Handler for GET /chat - upgrade and hand the socket to a [`Connection`].
async fn chat_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(hub): State<Arc<Hub>>,
) -> Response {
    let limit = hub.config.max_frame_bytes;
    ws.max_frame_size(limit)
        .max_message_size(limit)
        .on_upgrade(move |socket| Connection::new(socket, addr, hub).run())
}
