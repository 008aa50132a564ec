//! Wire protocol for Teleport.
//!
//! This crate defines the "language" the server and its clients speak:
//!
//! - **Types** ([`SessionSnapshot`], [`ServerMessage`], [`Role`], etc.):
//!   what gets serialized onto HTTP responses and WebSocket frames.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about locks, tokens or sockets. The
//! session layer produces snapshots of these types; the server layer
//! encodes them.
//!
//! ```text
//! Session (state, listeners) → Protocol (snapshot, message) → Server (HTTP/WS)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BlochState, JoinRequest, JoinResponse, LocalView, ParticipantView, Qubit, Role,
    ServerMessage, SessionId, SessionSnapshot, StepInfo, StepKey, TokenRequest,
};
