//! Role reservations for Teleport sessions.
//!
//! This crate decides who may act as which role:
//!
//! 1. **Reservation**: claiming a free role, renewing your own claim, or
//!    reclaiming one whose holder went away ([`Lobby::reserve`])
//! 2. **Token resolution**: proving a role by presenting its token
//!    ([`Lobby::resolve`])
//! 3. **Presence**: tracking which roles have a client attached, which
//!    decides when an idle reservation may be reclaimed
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← owns one Lobby per session, logs and broadcasts
//!     ↕
//! Lobby Layer (this crate)  ← role slots, tokens, reservation TTL
//!     ↕
//! Protocol Layer (below)  ← provides Role, ParticipantView
//! ```

mod error;
mod ids;
mod lobby;
mod participant;
pub mod reservation;

pub use error::LobbyError;
pub use ids::{IdGenerator, RandomIdGenerator};
pub use lobby::Lobby;
pub use participant::{LobbyConfig, Participant};
pub use reservation::{Reservation, ReservationOutcome};
