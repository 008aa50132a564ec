//! Listener bindings and state fan-out.
//!
//! A listener is anything that wants pushed updates for one session as
//! one role, usually a WebSocket connection. The registry only sees the
//! sending half of an unbounded channel; the transport owns the receiving
//! half and the socket.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use teleport_protocol::{LocalView, Role, ServerMessage, SessionId, SessionSnapshot};
use tokio::sync::mpsc;

/// Counter for generating unique listener IDs.
static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Allocates the next id.
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// What the coordinator asks a listener's transport to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Deliver this message to the client.
    Message(ServerMessage),
    /// Close the connection. Nothing more will be sent.
    Close { reason: String },
}

/// Channel sender for delivering outbound values to a listener.
pub type ListenerSender = mpsc::UnboundedSender<Outbound>;

#[derive(Debug)]
struct Binding {
    role: Role,
    sender: ListenerSender,
}

/// Every listener binding, grouped by session.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    sessions: HashMap<SessionId, HashMap<ListenerId, Binding>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `listener` to `role` in `session`. Re-registering the same id
    /// replaces the earlier binding.
    pub fn register(
        &mut self,
        session: &SessionId,
        listener: ListenerId,
        role: Role,
        sender: ListenerSender,
    ) {
        self.sessions
            .entry(session.clone())
            .or_default()
            .insert(listener, Binding { role, sender });
    }

    /// Removes a binding and returns the role it was bound to, or `None`
    /// if it wasn't registered.
    pub fn remove(&mut self, session: &SessionId, listener: ListenerId) -> Option<Role> {
        let bindings = self.sessions.get_mut(session)?;
        let removed = bindings.remove(&listener).map(|b| b.role);
        if bindings.is_empty() {
            self.sessions.remove(session);
        }
        removed
    }

    /// Returns `true` if any listener is still bound to `role` in `session`.
    pub fn has_role(&self, session: &SessionId, role: Role) -> bool {
        self.sessions
            .get(session)
            .is_some_and(|bindings| bindings.values().any(|b| b.role == role))
    }

    /// Sends [`Outbound::Close`] to every listener bound to `role` and
    /// drops their bindings. Returns how many were closed.
    pub fn close_role(&mut self, session: &SessionId, role: Role, reason: &str) -> usize {
        let Some(bindings) = self.sessions.get_mut(session) else {
            return 0;
        };

        let before = bindings.len();
        bindings.retain(|id, b| {
            if b.role != role {
                return true;
            }
            let close = Outbound::Close {
                reason: reason.to_string(),
            };
            if b.sender.send(close).is_err() {
                tracing::debug!(listener = %id, "close for detached listener dropped");
            }
            false
        });
        let closed = before - bindings.len();

        if bindings.is_empty() {
            self.sessions.remove(session);
        }
        closed
    }

    /// Pushes `snapshot` to every listener of its session, each with the
    /// local view of its own role.
    ///
    /// Sends never block. A send to a listener whose receiver is gone is
    /// ignored; that binding stays until its transport unregisters it.
    pub fn broadcast(&self, snapshot: &SessionSnapshot) {
        let Some(bindings) = self.sessions.get(&snapshot.id) else {
            return;
        };

        for (id, binding) in bindings {
            let msg = ServerMessage::StateUpdate {
                global: snapshot.clone(),
                local: LocalView::of(snapshot, binding.role),
            };
            if binding.sender.send(Outbound::Message(msg)).is_err() {
                tracing::debug!(
                    session_id = %snapshot.id,
                    listener = %id,
                    "state update for detached listener dropped"
                );
            }
        }
    }

    /// Number of listeners attached to `session`.
    pub fn count(&self, session: &SessionId) -> usize {
        self.sessions.get(session).map_or(0, HashMap::len)
    }
}
