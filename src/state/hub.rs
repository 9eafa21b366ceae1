//! The Hub - shared engine state for the chat broker.
//!
//! One `Hub` is built at startup (or per test server) and handed to every
//! connection as an `Arc<Hub>`. It owns the two concurrent maps and nothing
//! else mutable.

use crate::config::ChatConfig;
use crate::state::{RoomDirectory, Registry, SessionId, SessionIdGenerator};

/// Central shared state container.
pub struct Hub {
    /// Active sessions by display name.
    pub registry: Registry,
    /// Active sessions by room.
    pub rooms: RoomDirectory,
    /// Engine settings.
    pub config: ChatConfig,
    ids: SessionIdGenerator,
}

impl Hub {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            registry: Registry::new(),
            rooms: RoomDirectory::new(),
            config,
            ids: SessionIdGenerator::new(),
        }
    }

    /// Allocate an id for a freshly accepted connection.
    pub fn next_session_id(&self) -> SessionId {
        self.ids.next()
    }

    /// Room used when a login names none.
    pub fn default_room(&self) -> &str {
        self.config.default_room.trim()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(ChatConfig::default())
    }
}
