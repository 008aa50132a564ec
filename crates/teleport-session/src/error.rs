//! Error types for the session layer.

use teleport_lobby::LobbyError;
use teleport_protocol::{Role, SessionId, StepKey};

/// Errors returned by the session coordinator.
///
/// Together with [`LobbyError`] this is the complete set of failures a
/// caller can see. The transport layer matches on the variants to pick a
/// response status; it never inspects the message text.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists with this id.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The acting role may not advance the session out of its current step.
    #[error("role {role} not permitted for step {step}")]
    RoleNotPermittedForStep { role: Role, step: StepKey },

    /// A reservation or token error from the lobby layer.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
