//! Test server management.
//!
//! `TestServer` runs a gateway inside the test process on an ephemeral port.
//! `ChildServer` runs the real `chatd` binary for startup-path tests.

use chatd::config::ChatConfig;
use chatd::network::Gateway;
use chatd::state::Hub;
use std::net::SocketAddr;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// An in-process test server instance.
pub struct TestServer {
    addr: SocketAddr,
    hub: Arc<Hub>,
    task: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawn a server with default chat settings.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(ChatConfig::default()).await
    }

    /// Spawn a server with the Prometheus registry initialised.
    ///
    /// Metrics are process-wide, so a test binary using this should hold a
    /// single server or compare deltas.
    pub async fn spawn_with_metrics() -> anyhow::Result<Self> {
        chatd::metrics::init();
        Self::spawn().await
    }

    /// Spawn a server with the given chat settings.
    pub async fn spawn_with(config: ChatConfig) -> anyhow::Result<Self> {
        let hub = Arc::new(Hub::new(config));
        let gateway = Gateway::bind(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            Arc::clone(&hub),
            true,
        )
        .await?;
        let addr = gateway.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(e) = gateway.run().await {
                eprintln!("test gateway stopped: {e}");
            }
        });
        Ok(Self { addr, hub, task })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// WebSocket URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        format!("ws://{}/chat", self.addr)
    }

    /// Plain HTTP URL for `path`.
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shared engine state, for asserting on server-side bookkeeping.
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Fetch `/metrics` and read one sample, e.g. `chat_logins_total` or
    /// `chat_login_errors_total{error="name_taken"}`.
    pub async fn metric(&self, sample: &str) -> anyhow::Result<Option<f64>> {
        let body = reqwest::get(self.http_url("/metrics")).await?.text().await?;
        let value = body
            .lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| {
                let (key, value) = line.rsplit_once(' ')?;
                (key == sample).then(|| value.parse::<f64>().ok()).flatten()
            });
        Ok(value)
    }

    /// Poll until `check` holds or a second passes.
    pub async fn wait_for<F>(&self, mut check: F) -> bool
    where
        F: FnMut(&Hub) -> bool,
    {
        for _ in 0..100 {
            if check(&self.hub) {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }
        check(&self.hub)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The real binary, started as a child process.
#[allow(dead_code)]
pub struct ChildServer {
    child: Child,
    port: u16,
}

#[allow(dead_code)]
impl ChildServer {
    /// Path to the compiled `chatd` binary.
    pub fn binary() -> &'static str {
        env!("CARGO_BIN_EXE_chatd")
    }

    /// Start `chatd <port>` and wait until `/health` answers.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let child = Command::new(Self::binary())
            .arg(port.to_string())
            .env_remove("CHATD_CONFIG")
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .spawn()?;
        let server = Self { child, port };

        let url = server.health_url();
        for _ in 0..50 {
            if reqwest::get(&url).await.is_ok() {
                return Ok(server);
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("chatd did not come up on port {port}")
    }

    /// Run the binary with `args` and wait for it to exit.
    pub fn run_to_exit(args: &[&str]) -> anyhow::Result<ExitStatus> {
        let status = Command::new(Self::binary())
            .args(args)
            .env_remove("CHATD_CONFIG")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status)
    }

    /// Pick a port that was free a moment ago.
    pub fn free_port() -> anyhow::Result<u16> {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
        Ok(listener.local_addr()?.port())
    }

    pub fn health_url(&self) -> String {
        format!("http://127.0.0.1:{}/health", self.port)
    }

    pub fn chat_url(&self) -> String {
        format!("ws://127.0.0.1:{}/chat", self.port)
    }
}

impl Drop for ChildServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
