//! Network module.
//!
//! Contains the Gateway (HTTP listener and router) and the per-socket
//! Connection handler.

mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;
