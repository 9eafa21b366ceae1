//! Per-connection protocol state machine.
//!
//! ```text
//! ┌────────────────┐   LOGIN:<name>[:<room>]   ┌──────────┐   transport gone   ┌──────────┐
//! │ AwaitingLogin  ├──────────────────────────►│  Active  ├───────────────────►│  Closed  │
//! └───────┬────────┘                           └──────────┘                    └──────────┘
//!         │                  transport gone                                        ▲
//!         └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine is driven by exactly one connection task, so it needs no
//! locking of its own. All shared mutation goes through the [`Hub`].

use crate::error::LoginError;
use crate::handlers::broadcast::broadcast;
use crate::handlers::frame::{
    LOGIN_PROMPT, chat_line, echo_line, joined_text, left_text, parse_login, server_line,
};
use crate::state::{Hub, Session};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, prompt sent, no name claimed yet.
    AwaitingLogin,
    /// Logged in: holds the claimed name and the joined room.
    Active { name: String, room: String },
    /// Terminal.
    Closed,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Drives one session through login, chat and departure.
pub struct Protocol {
    session: Arc<Session>,
    hub: Arc<Hub>,
    state: SessionState,
}

impl Protocol {
    pub fn new(session: Arc<Session>, hub: Arc<Hub>) -> Self {
        Self {
            session,
            hub,
            state: SessionState::AwaitingLogin,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send the login prompt. Called once, right after the upgrade.
    pub fn greet(&self) {
        self.reply(LOGIN_PROMPT);
    }

    /// Handle one inbound text frame.
    pub fn on_frame(&mut self, frame: &str) {
        match &self.state {
            SessionState::AwaitingLogin => self.handle_login(frame),
            SessionState::Active { name, room } => self.handle_chat(name, room, frame),
            SessionState::Closed => {
                debug!(session = %self.session.id(), "Frame after close dropped");
            }
        }
    }

    fn handle_login(&mut self, frame: &str) {
        let Some(login) = parse_login(frame) else {
            debug!(session = %self.session.id(), "Ignoring frame before login");
            return;
        };

        if let Err(e) = self.claim(login.name) {
            debug!(session = %self.session.id(), name = %login.name, error = %e, "Login rejected");
            crate::metrics::record_login_error(e.error_code());
            self.reply(&e.to_reply());
            return;
        }

        let name = login.name.to_string();
        let room = login
            .room
            .unwrap_or_else(|| self.hub.default_room())
            .to_string();

        if self.hub.rooms.join(&room, &self.session) {
            crate::metrics::set_active_rooms(self.hub.rooms.room_count());
        }
        self.state = SessionState::Active {
            name: name.clone(),
            room: room.clone(),
        };
        crate::metrics::record_login();
        info!(
            session = %self.session.id(),
            addr = %self.session.addr(),
            name = %name,
            room = %room,
            "Session logged in"
        );

        let joined = joined_text(&name);
        broadcast(
            &self.hub,
            &room,
            &self.session,
            &server_line(&joined),
            Some(&echo_line(&joined)),
        );
    }

    fn claim(&self, name: &str) -> Result<(), LoginError> {
        if name.is_empty() {
            return Err(LoginError::EmptyName);
        }
        self.hub.registry.try_register(name, &self.session)
    }

    fn handle_chat(&self, name: &str, room: &str, text: &str) {
        crate::metrics::record_message();
        broadcast(
            &self.hub,
            room,
            &self.session,
            &chat_line(name, text),
            Some(&echo_line(text)),
        );
    }

    /// Tear the session down. Idempotent.
    ///
    /// Removes the session from the registry and its room before closing it,
    /// then tells the remaining peers. A session that never logged in leaves
    /// silently.
    pub fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        if previous == SessionState::Closed {
            return;
        }

        if let SessionState::Active { name, room } = &previous {
            self.hub.registry.release(name, &self.session);
            if self.hub.rooms.leave(room, &self.session) {
                debug!(room = %room, "Room emptied");
            }
            crate::metrics::set_active_rooms(self.hub.rooms.room_count());
            crate::metrics::record_logout();
            self.session.close();

            info!(session = %self.session.id(), name = %name, room = %room, "Session left");
            broadcast(
                &self.hub,
                room,
                &self.session,
                &server_line(&left_text(name)),
                None,
            );
        } else {
            self.session.close();
            debug!(session = %self.session.id(), "Closed before login");
        }
    }

    fn reply(&self, text: &str) {
        if let Err(e) = self.session.send(text) {
            warn!(session = %self.session.id(), error = %e, "Failed to reply");
            crate::metrics::record_send_failure(e.error_code());
        }
    }
}

impl Drop for Protocol {
    fn drop(&mut self) {
        self.close();
    }
}
