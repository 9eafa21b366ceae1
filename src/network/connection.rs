//! Connection - Handles an individual upgraded WebSocket.
//!
//! Each Connection runs in its own Tokio task plus one writer task:
//!
//! ```text
//!    ┌──────────────────────────────────────────────────────┐
//!    │                  Connection Task                     │
//!    │                                                      │
//!    │  SplitStream ──▶ Protocol::on_frame ──▶ broadcast    │
//!    │                                           │          │
//!    │                        Session::send ◀────┘          │
//!    │                              │                       │
//!    │                              ▼                       │
//!    │                     [ bounded mpsc queue ]           │
//!    └──────────────────────────────┬───────────────────────┘
//!                                   ▼
//!                       writer task ──▶ SplitSink
//! ```
//!
//! The reader never writes to the socket itself; everything outbound,
//! including the login prompt, goes through the session queue so that
//! per-peer ordering holds.

use crate::handlers::Protocol;
use crate::state::{Hub, Outbound, Session, SessionId};
use crate::telemetry::{FrameTimer, spans};
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, info, warn};

/// How long the writer may keep flushing after the reader is done.
const WRITER_GRACE: Duration = Duration::from_secs(2);

/// A client connection handler.
pub struct Connection {
    id: SessionId,
    addr: SocketAddr,
    hub: Arc<Hub>,
    socket: WebSocket,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(socket: WebSocket, addr: SocketAddr, hub: Arc<Hub>) -> Self {
        Self {
            id: hub.next_session_id(),
            addr,
            hub,
            socket,
        }
    }

    /// Run the connection until the client goes away.
    pub async fn run(self) {
        let span = spans::connection(self.id, self.addr);
        self.serve().instrument(span).await
    }

    async fn serve(self) {
        crate::metrics::record_connection();
        info!("Client connected");

        let (sink, mut stream) = self.socket.split();
        let (tx, rx) = mpsc::channel(self.hub.config.outbound_queue);
        let session = Arc::new(Session::new(self.id, self.addr, tx));
        let writer = tokio::spawn(write_loop(sink, rx).instrument(Span::current()));

        let mut protocol = Protocol::new(Arc::clone(&session), Arc::clone(&self.hub));
        protocol.greet();

        loop {
            let next = tokio::select! {
                next = stream.next() => next,
                _ = session.writer_gone() => {
                    debug!("Writer exited, ending read loop");
                    break;
                }
            };

            match next {
                Some(Ok(Message::Text(text))) => {
                    let _timer = FrameTimer::start();
                    debug!(len = text.len(), "Text frame");
                    protocol.on_frame(&text);
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!(len = data.len(), "Binary frame dropped");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Client sent close frame");
                    break;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Read error");
                    break;
                }
                None => break,
            }
        }

        protocol.close();
        drop(protocol);
        drop(session);

        if finish_writer(writer, WRITER_GRACE).await == WriterExit::Aborted {
            warn!("Writer stalled on a client that stopped reading, aborted");
        }
        info!("Client disconnected");
    }
}

/// How the writer task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterExit {
    Finished,
    Failed,
    Aborted,
}

/// Wait up to `grace` for the writer, then abort it.
///
/// A peer that stops reading leaves the writer parked in `sink.send`, and a
/// full queue means no close frame was ever queued to end it.
async fn finish_writer(mut writer: JoinHandle<()>, grace: Duration) -> WriterExit {
    match tokio::time::timeout(grace, &mut writer).await {
        Ok(Ok(())) => WriterExit::Finished,
        Ok(Err(e)) => {
            warn!(error = %e, "Writer task failed");
            WriterExit::Failed
        }
        Err(_) => {
            writer.abort();
            WriterExit::Aborted
        }
    }
}

/// Drain the session queue into the socket.
///
/// Ends on `Outbound::Close`, on the first write error, or once every
/// sender is gone.
async fn write_loop(mut sink: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(frame) = rx.recv().await {
        match frame {
            Outbound::Text(text) => {
                if let Err(e) = sink.send(Message::Text(text.to_string())).await {
                    debug!(error = %e, "Write failed");
                    return;
                }
            }
            Outbound::Close => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    debug!(error = %e, "Close frame not sent");
                }
                break;
            }
        }
    }
    let _ = sink.close().await;
}
