//! Session - one live client connection as seen by the engine.
//!
//! A `Session` is a pure conduit: it owns the sending half of a bounded
//! outbound queue that the connection's writer task drains into the socket.
//! It never interprets what passes through it.
//!
//! ```text
//!   broadcast / protocol ──send()──▶ [ mpsc queue ] ──▶ writer task ──▶ WebSocket
//!                         ──close()─▶ Outbound::Close ─┘
//! ```

use crate::error::SendError;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Process-unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:06}", self.0)
    }
}

/// Generates unique session IDs.
///
/// Counter starts at 1 so that a zeroed id never names a live session.
pub struct SessionIdGenerator {
    counter: AtomicU64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> SessionId {
        SessionId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame queued for the writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// One text frame.
    Text(Arc<str>),
    /// Send a close frame and release the socket.
    Close,
}

/// One logical client connection.
pub struct Session {
    id: SessionId,
    addr: SocketAddr,
    tx: mpsc::Sender<Outbound>,
    open: AtomicBool,
}

impl Session {
    /// Create a session around the sending half of its outbound queue.
    pub fn new(id: SessionId, addr: SocketAddr, tx: mpsc::Sender<Outbound>) -> Self {
        Self {
            id,
            addr,
            tx,
            open: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queue one text frame.
    ///
    /// Never waits: a saturated queue is reported as [`SendError::QueueFull`]
    /// so a slow peer cannot stall whoever is broadcasting to it.
    pub fn send(&self, text: impl Into<Arc<str>>) -> Result<(), SendError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(SendError::Closed);
        }
        match self.tx.try_send(Outbound::Text(text.into())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SendError::QueueFull),
            Err(TrySendError::Closed(_)) => {
                // Writer is gone: the socket is dead even if nobody called close().
                self.open.store(false, Ordering::Release);
                Err(SendError::Closed)
            }
        }
    }

    /// Close the session. Idempotent.
    ///
    /// Returns `true` for the call that actually performed the transition.
    pub fn close(&self) -> bool {
        if !self.open.swap(false, Ordering::AcqRel) {
            return false;
        }
        if let Err(TrySendError::Full(_)) = self.tx.try_send(Outbound::Close) {
            // The writer exits anyway once every sender is dropped.
            tracing::debug!(session = %self.id, "Outbound queue full, close frame skipped");
        }
        true
    }

    /// Whether the session still accepts frames. May race with `close()`.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    /// Resolves once the writer task has dropped its end of the queue.
    pub async fn writer_gone(&self) {
        self.tx.closed().await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("open", &self.is_open())
            .finish()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}

/// Build a detached session for tests, returning the queue's receiving half.
#[cfg(test)]
pub(crate) fn test_session(
    ids: &SessionIdGenerator,
    capacity: usize,
) -> (Arc<Session>, mpsc::Receiver<Outbound>) {
    let (tx, rx) = mpsc::channel(capacity);
    let addr = SocketAddr::from(([127, 0, 0, 1], 40000));
    (Arc::new(Session::new(ids.next(), addr, tx)), rx)
}

/// Drain every text frame currently queued.
#[cfg(test)]
pub(crate) fn drain_text(rx: &mut mpsc::Receiver<Outbound>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        if let Outbound::Text(text) = frame {
            out.push(text.to_string());
        }
    }
    out
}
