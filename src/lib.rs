//! chatd - multi-room WebSocket chat broker.
//!
//! Clients connect to `/chat`, claim a unique display name, join a room and
//! exchange text lines with everyone else in that room.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod network;
pub mod state;
pub mod telemetry;
