//! Telemetry utilities for frame timing and tracing spans.

use std::time::Instant;

/// Guard for timing the handling of one inbound frame.
///
/// Records the latency when dropped.
pub struct FrameTimer {
    start: Instant,
}

impl FrameTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for FrameTimer {
    fn drop(&mut self) {
        crate::metrics::record_frame_duration(self.start.elapsed().as_secs_f64());
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::state::SessionId;
    use std::net::SocketAddr;
    use tracing::{Span, info_span};

    /// Create a span for a client connection.
    pub fn connection(session: SessionId, addr: SocketAddr) -> Span {
        info_span!("connection", session = %session, addr = %addr)
    }
}
