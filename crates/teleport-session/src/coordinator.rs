//! The coordinator: the single entry point transports call into.
//!
//! Every operation takes the one lock that guards both the session store
//! and the listener registry, decides, mutates, logs and broadcasts while
//! holding it, then returns a snapshot. Two mutations on the same session
//! can never interleave, and listeners receive updates in commit order.

use std::sync::Arc;

use teleport_lobby::{IdGenerator, LobbyConfig, RandomIdGenerator, Reservation};
use teleport_protocol::{Role, SessionId, SessionSnapshot};
use tokio::sync::RwLock;

use crate::listeners::{ListenerId, ListenerRegistry, ListenerSender};
use crate::session::{Advance, Session};
use crate::store::SessionStore;
use crate::SessionError;

#[derive(Debug, Default)]
struct Inner {
    store: SessionStore,
    listeners: ListenerRegistry,
}

/// Owns every session and every listener binding.
///
/// Shared across request tasks as `Arc<Coordinator>`.
pub struct Coordinator {
    inner: RwLock<Inner>,
    ids: Arc<dyn IdGenerator>,
    config: LobbyConfig,
}

impl Coordinator {
    /// Creates a coordinator that issues ids with [`RandomIdGenerator`].
    pub fn new(config: LobbyConfig) -> Self {
        Self::with_id_generator(config, Arc::new(RandomIdGenerator))
    }

    /// Creates a coordinator with a custom identifier generator.
    pub fn with_id_generator(config: LobbyConfig, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            ids,
            config,
        }
    }

    /// Creates a session with every role free.
    ///
    /// # Errors
    /// Fails only if no unused session id could be generated.
    pub async fn create_session(&self) -> Result<SessionSnapshot, SessionError> {
        let id = SessionId::from(self.ids.new_id()?);
        let session = Session::new(id.clone(), self.config);
        let snapshot = session.snapshot();

        self.inner.write().await.store.insert(session)?;
        tracing::info!(session_id = %id, "session created");
        Ok(snapshot)
    }

    /// Returns a copy of the session's current state.
    pub async fn get_session(&self, id: &SessionId) -> Result<SessionSnapshot, SessionError> {
        let inner = self.inner.read().await;
        Ok(inner.store.get(id)?.snapshot())
    }

    /// Reserves `role_name` in a session; see [`teleport_lobby::Lobby::reserve`].
    ///
    /// A new or reclaimed reservation is logged. Every success broadcasts.
    pub async fn join_session(
        &self,
        id: &SessionId,
        role_name: &str,
        presented: Option<&str>,
    ) -> Result<Reservation, SessionError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let session = inner.store.get_mut(id)?;

        let reservation = session
            .lobby_mut()
            .reserve(role_name, presented, self.ids.as_ref())?;

        if reservation.outcome.issues_token() {
            session.push_log(format!("role reserved: {}", reservation.role));
            tracing::info!(
                session_id = %id,
                role = %reservation.role,
                outcome = ?reservation.outcome,
                "role reserved"
            );
        }

        inner.listeners.broadcast(&session.snapshot());
        Ok(reservation)
    }

    /// Advances the session one step on behalf of the token's role.
    ///
    /// At the terminal step this returns the unchanged state and
    /// broadcasts nothing.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]
    /// - [`teleport_lobby::LobbyError::UnknownToken`] (wrapped)
    /// - [`SessionError::RoleNotPermittedForStep`]
    pub async fn advance_step(
        &self,
        id: &SessionId,
        token: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let session = inner.store.get_mut(id)?;

        let role = session.lobby().resolve(token)?;
        match session.advance(role)? {
            Advance::Terminal => Ok(session.snapshot()),
            Advance::Entered(step) => {
                tracing::info!(session_id = %id, %role, %step, "step advanced");
                let snapshot = session.snapshot();
                inner.listeners.broadcast(&snapshot);
                Ok(snapshot)
            }
        }
    }

    /// Releases the token's role and closes every listener bound to it.
    pub async fn leave_session(
        &self,
        id: &SessionId,
        token: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let session = inner.store.get_mut(id)?;

        let role = session.lobby().resolve(token)?;
        session.lobby_mut().release(role);
        let closed = inner.listeners.close_role(id, role, "role released");
        session.push_log(format!("role released: {role}"));
        tracing::info!(session_id = %id, %role, closed, "role released");

        let snapshot = session.snapshot();
        inner.listeners.broadcast(&snapshot);
        Ok(snapshot)
    }

    /// Binds a listener to the token's role and marks that role connected.
    ///
    /// Sends nothing. The caller delivers its own `joined` message first
    /// and then calls [`Coordinator::broadcast`], so the new listener sees
    /// `joined` before any `state_update`.
    pub async fn register_listener(
        &self,
        id: &SessionId,
        token: &str,
        listener: ListenerId,
        sender: ListenerSender,
    ) -> Result<(SessionSnapshot, Role), SessionError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let session = inner.store.get_mut(id)?;

        let role = session.lobby().resolve(token)?;
        inner.listeners.register(id, listener, role, sender);
        session.lobby_mut().connect(role);
        tracing::info!(session_id = %id, %role, %listener, "listener attached");

        Ok((session.snapshot(), role))
    }

    /// Detaches a listener.
    ///
    /// The role stays connected while another listener is bound to it.
    /// Unknown listeners and unknown sessions are ignored.
    pub async fn unregister_listener(&self, id: &SessionId, listener: ListenerId) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let Some(role) = inner.listeners.remove(id, listener) else {
            return;
        };
        let Ok(session) = inner.store.get_mut(id) else {
            return;
        };

        if inner.listeners.has_role(id, role) {
            session.lobby_mut().touch(role);
        } else {
            session.lobby_mut().disconnect(role);
        }
        tracing::info!(session_id = %id, %role, %listener, "listener detached");

        inner.listeners.broadcast(&session.snapshot());
    }

    /// Pushes the current state to every listener of the session. Unknown
    /// sessions are ignored.
    pub async fn broadcast(&self, id: &SessionId) {
        let inner = self.inner.read().await;
        if let Ok(session) = inner.store.get(id) {
            inner.listeners.broadcast(&session.snapshot());
        }
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.store.len()
    }

    /// Number of listeners attached to a session.
    pub async fn listener_count(&self, id: &SessionId) -> usize {
        self.inner.read().await.listeners.count(id)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
