//! Room fan-out.
//!
//! Delivers one line to every other member of a room, then echoes to the
//! sender. A failed peer never aborts the loop and never surfaces to the
//! sender; it is logged here and reaped later by its own connection task.

use crate::state::{Hub, Session};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a single broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fanout {
    /// Peers whose queue accepted the line.
    pub delivered: usize,
    /// Peers whose send failed.
    pub failed: usize,
    /// Whether the sender's echo was queued.
    pub echoed: bool,
}

/// Send `line` to every member of `room` except `sender`, then `echo` to the
/// sender if it is still open.
///
/// Works on a snapshot of the membership: peers that join mid-broadcast miss
/// this line, peers that left may still be attempted and fail. Peers are not
/// pre-filtered by `is_open`; the send result is authoritative.
pub fn broadcast(
    hub: &Hub,
    room: &str,
    sender: &Session,
    line: &str,
    echo: Option<&str>,
) -> Fanout {
    let line: Arc<str> = Arc::from(line);
    let mut report = Fanout::default();

    for peer in hub.rooms.members(room) {
        if peer.id() == sender.id() {
            continue;
        }
        match peer.send(Arc::clone(&line)) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                report.failed += 1;
                warn!(peer = %peer.id(), room = %room, error = %e, "Failed to deliver to peer");
                crate::metrics::record_send_failure(e.error_code());
            }
        }
    }

    if let Some(echo) = echo
        && sender.is_open()
    {
        match sender.send(echo) {
            Ok(()) => report.echoed = true,
            Err(e) => {
                warn!(session = %sender.id(), error = %e, "Failed to echo to sender");
                crate::metrics::record_send_failure(e.error_code());
            }
        }
    }

    debug!(
        room = %room,
        delivered = report.delivered,
        failed = report.failed,
        echoed = report.echoed,
        "Broadcast complete"
    );
    crate::metrics::record_fanout(report.delivered);
    report
}
