//! Room directory - grouping of active sessions by room name.
//!
//! ```text
//! Room: public          Room: private
//! ├── S000001 (Alice)   └── S000004 (PrivateUser)
//! ├── S000002 (Bob)
//! └── S000003 (Carol)
//! ```
//!
//! A room exists exactly as long as it has members: the `leave` that empties
//! a set also deletes it, under the same shard lock.

use crate::state::{Session, SessionId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrent room → membership map.
#[derive(Default)]
pub struct RoomDirectory {
    rooms: DashMap<String, HashMap<SessionId, Arc<Session>>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session` to `room`, creating the room on demand.
    ///
    /// Returns `true` if the room had to be created.
    pub fn join(&self, room: &str, session: &Arc<Session>) -> bool {
        let mut created = false;
        self.rooms
            .entry(room.to_string())
            .or_insert_with(|| {
                created = true;
                HashMap::new()
            })
            .insert(session.id(), Arc::clone(session));
        created
    }

    /// Remove `session` from `room`, deleting the room when it empties.
    ///
    /// Returns `true` if the room was deleted.
    pub fn leave(&self, room: &str, session: &Session) -> bool {
        match self.rooms.entry(room.to_string()) {
            Entry::Occupied(mut members) => {
                members.get_mut().remove(&session.id());
                if members.get().is_empty() {
                    members.remove();
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Point-in-time copy of a room's members. Empty if the room does not exist.
    pub fn members(&self, room: &str) -> Vec<Arc<Session>> {
        self.rooms
            .get(room)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, room: &str, session: &Session) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains_key(&session.id()))
    }

    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Names of every room that currently has members.
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }
}
