//! Test chat client.
//!
//! Provides a WebSocket client for integration testing that can send lines
//! and assert on received responses.

use chatd::handlers::LOGIN_PROMPT;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A test chat client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect and consume the login prompt.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (ws, _response) = connect_async(url).await?;
        let mut client = Self { ws };
        let prompt = client.recv().await?;
        anyhow::ensure!(prompt == LOGIN_PROMPT, "unexpected greeting: {prompt:?}");
        Ok(client)
    }

    /// Connect and log in as `name` in the default room.
    pub async fn login(url: &str, name: &str) -> anyhow::Result<Self> {
        Self::login_frame(url, &format!("LOGIN:{name}"), name).await
    }

    /// Connect and log in as `name` in `room`.
    pub async fn login_to(url: &str, name: &str, room: &str) -> anyhow::Result<Self> {
        Self::login_frame(url, &format!("LOGIN:{name}:{room}"), name).await
    }

    async fn login_frame(url: &str, frame: &str, name: &str) -> anyhow::Result<Self> {
        let mut client = Self::connect(url).await?;
        client.send(frame).await?;
        let confirmation = client.recv().await?;
        let expected = format!("Вы: {name} подключился");
        anyhow::ensure!(
            confirmation == expected,
            "login as {name:?} failed: {confirmation:?}"
        );
        Ok(client)
    }

    /// Send one text frame.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.ws.send(Message::Text(line.to_string())).await?;
        Ok(())
    }

    /// Send one binary frame.
    pub async fn send_binary(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.ws.send(Message::Binary(data.to_vec())).await?;
        Ok(())
    }

    /// Receive a single text line from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a text line with a timeout. Control frames are skipped.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        loop {
            let frame = timeout(dur, self.ws.next())
                .await?
                .ok_or_else(|| anyhow::anyhow!("connection closed"))??;
            match frame {
                Message::Text(text) => return Ok(text),
                Message::Close(frame) => anyhow::bail!("server closed: {frame:?}"),
                _ => continue,
            }
        }
    }

    /// Receive lines until the given predicate returns true.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Assert nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Ok(line) => anyhow::bail!("expected silence, got {line:?}"),
            Err(e) if e.is::<tokio::time::error::Elapsed>() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Close the connection cleanly.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
