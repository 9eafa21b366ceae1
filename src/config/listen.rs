//! Network listener configuration.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port used when neither the config file nor the command line names one.
pub const DEFAULT_PORT: u16 = 1401;

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ListenConfig {
    /// Address to bind to (default: 0.0.0.0).
    #[serde(default = "default_address")]
    pub address: IpAddr,
    /// TCP port for both `/chat` and `/health` (default: 1401).
    /// Port 0 asks the OS for an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ListenConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
