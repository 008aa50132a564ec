//! Session store: every live session, keyed by id.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use teleport_lobby::LobbyError;
use teleport_protocol::SessionId;

use crate::{Session, SessionError};

/// Owns all sessions for the lifetime of the process.
///
/// Not synchronized on its own; the coordinator keeps it behind its lock
/// together with the listener registry.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session.
    ///
    /// # Errors
    /// Returns [`LobbyError::IdentifierGenerationFailed`] (wrapped) if the
    /// id is already in use. The live session is left untouched.
    pub fn insert(&mut self, session: Session) -> Result<(), SessionError> {
        match self.sessions.entry(session.id().clone()) {
            Entry::Occupied(taken) => Err(LobbyError::IdentifierGenerationFailed(format!(
                "session id already in use: {}",
                taken.key()
            ))
            .into()),
            Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session has this id.
    pub fn get(&self, id: &SessionId) -> Result<&Session, SessionError> {
        self.sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session has this id.
    pub fn get_mut(&mut self, id: &SessionId) -> Result<&mut Session, SessionError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
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
    use teleport_lobby::LobbyConfig;

    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut store = SessionStore::new();
        assert!(store.is_empty());

        store
            .insert(Session::new(SessionId::from("a"), LobbyConfig::default()))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.contains(&SessionId::from("a")));
        assert_eq!(store.get(&SessionId::from("a")).unwrap().id().as_str(), "a");
    }

    #[test]
    fn test_duplicate_id_keeps_live_session() {
        let mut store = SessionStore::new();
        let id = SessionId::from("a");
        let mut live = Session::new(id.clone(), LobbyConfig::default());
        live.push_log("live");
        store.insert(live).unwrap();

        let result = store.insert(Session::new(id.clone(), LobbyConfig::default()));

        assert!(matches!(
            result,
            Err(SessionError::Lobby(LobbyError::IdentifierGenerationFailed(_)))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&id).unwrap().snapshot().log.last().map(String::as_str),
            Some("live")
        );
    }

    #[test]
    fn test_missing_session_is_not_found() {
        let mut store = SessionStore::new();
        let id = SessionId::from("nope");

        assert!(matches!(store.get(&id), Err(SessionError::NotFound(ref missing)) if *missing == id));
        assert!(matches!(store.get_mut(&id), Err(SessionError::NotFound(_))));
    }
}
