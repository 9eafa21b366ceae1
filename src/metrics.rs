//! Prometheus metrics collection for chatd.
//!
//! Exposed at `/metrics` on the chat port when enabled.
//!
//! - `chat_connections_total` - WebSocket connections accepted
//! - `chat_active_sessions` - sessions currently logged in (gauge)
//! - `chat_login_errors_total{error}` - rejected logins by reason
//! - `chat_message_fanout` - peers reached per broadcast (histogram)
//! - `chat_frame_duration_seconds` - inbound frame handling latency (histogram)

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Total WebSocket connections accepted on `/chat`.
pub static CONNECTIONS: OnceLock<IntCounter> = OnceLock::new();

/// Total successful logins.
pub static LOGINS: OnceLock<IntCounter> = OnceLock::new();

/// Rejected logins by error code.
pub static LOGIN_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Chat messages accepted from active sessions.
pub static MESSAGES: OnceLock<IntCounter> = OnceLock::new();

/// Frames that could not be handed to a peer, by error code.
pub static SEND_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Sessions currently in the active state.
pub static ACTIVE_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

/// Rooms with at least one member.
pub static ACTIVE_ROOMS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Peers reached per broadcast.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Time spent handling one inbound frame, in seconds.
pub static FRAME_DURATION: OnceLock<Histogram> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize the Prometheus metrics registry.
///
/// Call at startup; later calls are no-ops. Until then every `record_*`
/// helper is a no-op, which is what most unit tests rely on.
pub fn init() {
    INIT.call_once(register_all);
}

fn register_all() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(CONNECTIONS, IntCounter::new("chat_connections_total", "WebSocket connections accepted"));
    register!(LOGINS, IntCounter::new("chat_logins_total", "Successful logins"));
    register!(LOGIN_ERRORS, IntCounterVec::new(Opts::new("chat_login_errors_total", "Rejected logins by reason"), &["error"]));
    register!(MESSAGES, IntCounter::new("chat_messages_total", "Chat messages received from active sessions"));
    register!(SEND_FAILURES, IntCounterVec::new(Opts::new("chat_send_failures_total", "Frames not delivered to a session"), &["error"]));
    register!(ACTIVE_SESSIONS, IntGauge::new("chat_active_sessions", "Sessions currently logged in"));
    register!(ACTIVE_ROOMS, IntGauge::new("chat_active_rooms", "Rooms with at least one member"));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("chat_message_fanout", "Peers reached per broadcast")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0])));
    register!(FRAME_DURATION, Histogram::with_opts(
        HistogramOpts::new("chat_frame_duration_seconds", "Time to handle one inbound frame")
            .buckets(vec![0.00001, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for chat-specific metric updates
// ============================================================================

#[inline]
pub fn record_connection() {
    if let Some(c) = CONNECTIONS.get() {
        c.inc();
    }
}

/// Record a successful login; the session becomes active.
#[inline]
pub fn record_login() {
    if let Some(c) = LOGINS.get() {
        c.inc();
    }
    if let Some(g) = ACTIVE_SESSIONS.get() {
        g.inc();
    }
}

/// Record an active session leaving.
#[inline]
pub fn record_logout() {
    if let Some(g) = ACTIVE_SESSIONS.get() {
        g.dec();
    }
}

#[inline]
pub fn record_login_error(error: &str) {
    if let Some(c) = LOGIN_ERRORS.get() {
        c.with_label_values(&[error]).inc();
    }
}

#[inline]
pub fn record_message() {
    if let Some(c) = MESSAGES.get() {
        c.inc();
    }
}

#[inline]
pub fn record_send_failure(error: &str) {
    if let Some(c) = SEND_FAILURES.get() {
        c.with_label_values(&[error]).inc();
    }
}

/// Record how many peers one broadcast reached.
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn record_frame_duration(seconds: f64) {
    if let Some(h) = FRAME_DURATION.get() {
        h.observe(seconds);
    }
}

#[inline]
pub fn set_active_rooms(count: usize) {
    if let Some(g) = ACTIVE_ROOMS.get() {
        g.set(count as i64);
    }
}
