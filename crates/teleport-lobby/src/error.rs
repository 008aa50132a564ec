//! Error types for the lobby layer.

use teleport_protocol::Role;

/// Errors that can occur while reserving, resolving or releasing roles.
///
/// Every variant is a local, recoverable condition. None of them leaves a
/// half-applied reservation behind: the lobby decides first and commits
/// only on success.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The requested role name isn't one of the fixed roles.
    #[error("role unsupported: {0}")]
    RoleUnsupported(String),

    /// Someone else holds an active reservation for this role: they are
    /// connected, or their last activity is still within the reservation TTL.
    #[error("role already taken: {0}")]
    RoleAlreadyTaken(Role),

    /// The presented token doesn't belong to any participant.
    /// Could be stale (the role was released or reclaimed), a typo, or empty.
    #[error("unknown participant token")]
    UnknownToken,

    /// The identifier generator failed to produce a token or id.
    #[error("identifier generation failed: {0}")]
    IdentifierGenerationFailed(String),
}
