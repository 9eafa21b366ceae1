//! Registry - process-wide index of active sessions by display name.
//!
//! The atomic check-and-insert in [`Registry::try_register`] is the only thing
//! standing between two clients and the same name, so it goes through the
//! DashMap entry API: the shard lock is held across the check and the insert.

use crate::error::LoginError;
use crate::state::Session;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Concurrent name → session map.
#[derive(Default)]
pub struct Registry {
    sessions: DashMap<String, Arc<Session>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `session` iff nobody holds it yet.
    ///
    /// Linearizable per name: of any number of concurrent calls for the same
    /// name, exactly one returns `Ok`.
    pub fn try_register(&self, name: &str, session: &Arc<Session>) -> Result<(), LoginError> {
        match self.sessions.entry(name.to_string()) {
            Entry::Occupied(_) => Err(LoginError::NameTaken(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(session));
                Ok(())
            }
        }
    }

    /// Release `name` if, and only if, `session` still holds it.
    ///
    /// Single-shard lookup; use this when the caller already knows the name.
    pub fn release(&self, name: &str, session: &Session) -> bool {
        self.sessions
            .remove_if(name, |_, held| held.id() == session.id())
            .is_some()
    }

    /// Remove whichever entry points at `session`. Idempotent.
    ///
    /// Scans the whole map to find the name; prefer [`Registry::release`].
    ///
    /// Returns the name that was released, if any.
    pub fn unregister(&self, session: &Session) -> Option<String> {
        let name = self.name_of(session)?;
        self.sessions
            .remove_if(&name, |_, held| held.id() == session.id())
            .map(|(name, _)| name)
    }

    /// Reverse lookup by scanning the map.
    pub fn name_of(&self, session: &Session) -> Option<String> {
        self.sessions
            .iter()
            .find(|entry| entry.value().id() == session.id())
            .map(|entry| entry.key().clone())
    }

    /// Look up the session currently holding `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Session>> {
        self.sessions.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sessions.contains_key(name)
    }

    /// Point-in-time copy of every binding.
    ///
    /// No lock survives the call; peers in the snapshot may already be closed
    /// by the time a caller gets to them.
    pub fn snapshot(&self) -> Vec<(String, Arc<Session>)> {
        self.sessions
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionIdGenerator;
    use crate::state::session::test_session;

    #[test]
    fn test_register_and_lookup() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (alice, _rx) = test_session(&ids, 4);

        registry.try_register("Alice", &alice).unwrap();

        assert!(registry.contains("Alice"));
        assert_eq!(registry.name_of(&alice).as_deref(), Some("Alice"));
        assert_eq!(registry.get("Alice").map(|s| s.id()), Some(alice.id()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (first, _rx1) = test_session(&ids, 4);
        let (second, _rx2) = test_session(&ids, 4);

        registry.try_register("MultiUser", &first).unwrap();
        let err = registry.try_register("MultiUser", &second).unwrap_err();

        assert_eq!(err, LoginError::NameTaken("MultiUser".into()));
        assert_eq!(registry.get("MultiUser").map(|s| s.id()), Some(first.id()));
        assert!(registry.name_of(&second).is_none());
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (bob, _rx) = test_session(&ids, 4);
        registry.try_register("Bob", &bob).unwrap();

        assert_eq!(registry.unregister(&bob).as_deref(), Some("Bob"));
        assert_eq!(registry.unregister(&bob), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_leaves_other_holders_alone() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (bob, _rx1) = test_session(&ids, 4);
        let (stranger, _rx2) = test_session(&ids, 4);
        registry.try_register("Bob", &bob).unwrap();

        assert_eq!(registry.unregister(&stranger), None);
        assert!(registry.contains("Bob"));
    }

    #[test]
    fn test_name_is_reusable_after_unregister() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (first, _rx1) = test_session(&ids, 4);
        let (second, _rx2) = test_session(&ids, 4);

        registry.try_register("Carol", &first).unwrap();
        registry.unregister(&first);
        registry.try_register("Carol", &second).unwrap();

        assert_eq!(registry.name_of(&second).as_deref(), Some("Carol"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (alice, _rx1) = test_session(&ids, 4);
        let (bob, _rx2) = test_session(&ids, 4);
        registry.try_register("Alice", &alice).unwrap();
        registry.try_register("Bob", &bob).unwrap();

        let snapshot = registry.snapshot();
        // Structural changes after the snapshot must not block or affect it.
        registry.unregister(&alice);

        let mut names: Vec<_> = snapshot.into_iter().map(|(name, _)| name).collect();
        names.sort();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let ids = SessionIdGenerator::new();
        let registry = Arc::new(Registry::new());
        let sessions: Vec<_> = (0..16).map(|_| test_session(&ids, 4)).collect();

        let winners = std::thread::scope(|scope| {
            let handles: Vec<_> = sessions
                .iter()
                .map(|(session, _)| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || registry.try_register("Contested", session).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join())
                .filter(|r| matches!(r, Ok(true)))
                .count()
        });

        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_only_frees_own_binding() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (holder, _rx1) = test_session(&ids, 4);
        let (stranger, _rx2) = test_session(&ids, 4);
        registry.try_register("Alice", &holder).unwrap();

        assert!(!registry.release("Alice", &stranger));
        assert_eq!(registry.get("Alice").map(|s| s.id()), Some(holder.id()));

        assert!(registry.release("Alice", &holder));
        assert!(!registry.contains("Alice"));
        assert!(!registry.release("Alice", &holder), "second release is a no-op");
    }
}
