//! The role reservation decision.
//!
//! Given a participant record and what the client presented, decide
//! whether to grant a fresh reservation, renew the existing one, reclaim a
//! stale one, or refuse. This is pure logic: it reads the record and the
//! clock value it's handed and mutates nothing.
//!
//! ```text
//!   token empty ───────────────────────────────→ Granted
//!   token == presented ────────────────────────→ Renewed
//!   connected || last_seen < ttl ago ──────────→ RoleAlreadyTaken
//!   otherwise (disconnected, past ttl) ────────→ Reclaimed
//! ```

use std::time::{Duration, Instant};

use teleport_protocol::Role;

use crate::{LobbyError, Participant};

/// How a successful reservation came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// The role was free; a new token was issued.
    Granted,
    /// The holder presented their current token; nothing but the
    /// activity timestamp changed.
    Renewed,
    /// The previous holder was disconnected past the TTL; their token was
    /// replaced by a new one.
    Reclaimed,
}

impl ReservationOutcome {
    /// Returns `true` if a new token is issued (and the reservation logged).
    pub fn issues_token(&self) -> bool {
        matches!(self, Self::Granted | Self::Reclaimed)
    }
}

/// A successful reservation: the role and the token that now proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub role: Role,
    pub token: String,
    pub outcome: ReservationOutcome,
}

/// Decides what a reservation request for `participant` should do.
///
/// An empty presented token is treated the same as no token.
///
/// # Errors
/// Returns [`LobbyError::RoleAlreadyTaken`] if the current holder is still
/// active.
pub fn decide(
    participant: &Participant,
    presented: Option<&str>,
    ttl: Duration,
    now: Instant,
) -> Result<ReservationOutcome, LobbyError> {
    if !participant.is_reserved() {
        return Ok(ReservationOutcome::Granted);
    }

    let presented = presented.filter(|t| !t.is_empty());
    if presented == Some(participant.token.as_str()) {
        return Ok(ReservationOutcome::Renewed);
    }

    if participant.is_active(ttl, now) {
        return Err(LobbyError::RoleAlreadyTaken(participant.role));
    }

    Ok(ReservationOutcome::Reclaimed)
}
