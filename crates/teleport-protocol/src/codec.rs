//! Codec trait and implementations for serializing outbound messages.
//!
//! The streaming transport doesn't care HOW a [`ServerMessage`] becomes
//! bytes; it asks a [`Codec`]. Today that is [`JsonCodec`], because the
//! browser clients speak JSON. A binary codec can be slotted in without
//! touching the transport.
//!
//! [`ServerMessage`]: crate::ServerMessage

use serde::Serialize;

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes.
///
/// Clients never send frames the server has to read, so there is no
/// decoding side.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Serializes a value into a UTF-8 string, for text frames.
    ///
    /// The default implementation encodes and then validates UTF-8, which
    /// is free for text-based codecs and an error for binary ones.
    fn encode_text<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|e| {
            ProtocolError::InvalidMessage(format!("codec produced non-UTF-8 output: {e}"))
        })
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use teleport_protocol::{Codec, JsonCodec, Role};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Role::Alice).unwrap();
/// assert_eq!(bytes, br#""alice""#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn encode_text<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        // Skip the UTF-8 re-validation: serde_json output is always UTF-8.
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{LocalView, Role, ServerMessage};

    #[test]
    fn test_json_codec_encode_text_matches_encode() {
        let codec = JsonCodec;
        let msg = ServerMessage::Error {
            message: "session not found".into(),
        };

        let text = codec.encode_text(&msg).unwrap();
        let bytes = codec.encode(&msg).unwrap();

        assert_eq!(text.as_bytes(), bytes.as_slice());
        assert!(text.contains(r#""type":"error""#));
    }

    #[test]
    fn test_json_codec_encodes_local_view() {
        let view = LocalView {
            role: Role::Bob,
            state: "state restored".into(),
        };

        let text = JsonCodec.encode_text(&view).unwrap();

        assert_eq!(text, r#"{"role":"bob","state":"state restored"}"#);
    }
}
