//! Session coordination for Teleport.
//!
//! A session walks three participants through the teleportation protocol
//! one step at a time. This crate owns the sessions, decides who may
//! advance which step, derives every displayed qubit orientation from a
//! per-session hidden state, and pushes each committed change to the
//! attached listeners.
//!
//! # Key types
//!
//! - [`Coordinator`]: the async entry point transports call into
//! - [`Session`]: one session's state and step machine
//! - [`ListenerRegistry`]: listener bindings and fan-out
//! - [`Outbound`]: what a listener's transport receives
//!
//! # How it fits in the stack
//!
//! ```text
//! Transport (above)  ← HTTP handlers and WebSocket connections
//!     ↕
//! Session Layer (this crate)  ← sessions, steps, broadcast
//!     ↕
//! Lobby Layer (below)  ← role reservations and tokens
//! ```

mod coordinator;
mod error;
mod listeners;
mod session;
mod store;

pub mod bloch;
pub mod steps;

pub use coordinator::Coordinator;
pub use error::SessionError;
pub use listeners::{ListenerId, ListenerRegistry, ListenerSender, Outbound};
pub use session::{Advance, Session};
pub use store::SessionStore;
