//! Error types for the protocol layer.
//!
//! Each crate in Teleport defines its own error enum. A `ProtocolError`
//! always means something went wrong turning values into bytes,
//! or a client sent a name the wire format doesn't know.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A role name outside the fixed role set.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// The message parsed but breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
