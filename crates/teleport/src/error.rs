//! Unified error type for the Teleport server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use teleport_lobby::LobbyError;
use teleport_protocol::ProtocolError;
use teleport_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapped variant auto-generates `From`
/// impls, so the `?` operator converts sub-crate errors automatically.
/// [`TeleportError::status`] picks the HTTP status from the variant alone.
#[derive(Debug, thiserror::Error)]
pub enum TeleportError {
    /// A session-level error (not found, permission, reservation).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A protocol-level error (encode, unknown role, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The request was malformed before it reached the coordinator.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A WebSocket send or receive failed.
    #[error("socket error: {0}")]
    Socket(#[from] axum::Error),

    /// The listen address could not be bound.
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl TeleportError {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Session(SessionError::RoleNotPermittedForStep { .. }) => StatusCode::FORBIDDEN,
            Self::Session(SessionError::Lobby(e)) => match e {
                LobbyError::RoleUnsupported(_) => StatusCode::BAD_REQUEST,
                LobbyError::RoleAlreadyTaken(_) => StatusCode::CONFLICT,
                LobbyError::UnknownToken => StatusCode::FORBIDDEN,
                LobbyError::IdentifierGenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Protocol(ProtocolError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Protocol(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Socket(_) | Self::Bind(_) | Self::Serve(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TeleportError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
