//! Participant records: who holds which role, and how recently they were seen.
//!
//! A participant is the server's record of one role slot in a session. It
//! tracks:
//! - WHETHER the role is reserved (a non-empty token)
//! - WHETHER a client is currently attached (a live listener)
//! - WHEN the holder was last active (so stale reservations can expire)

use std::time::{Duration, Instant};

use teleport_protocol::{ParticipantView, Role};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Configuration for reservation behavior.
#[derive(Debug, Clone, Copy)]
pub struct LobbyConfig {
    /// How long a disconnected holder keeps their role after their last
    /// activity. Once it elapses, anyone may reclaim the role.
    ///
    /// Default: 60 seconds. `Duration::ZERO` makes every disconnected
    /// reservation reclaimable immediately.
    pub reservation_ttl: Duration,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            reservation_ttl: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// The reservation and connection record bound to one role.
///
/// Created empty when the session is created, and only ever mutated after
/// that: participants are never added or removed.
///
/// Invariant: an empty `token` implies `connected == false`.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Which role this record belongs to.
    pub role: Role,

    /// The secret the holder presents to act as this role. Empty when the
    /// role is free.
    pub token: String,

    /// Set by a successful reservation, cleared on leave.
    pub taken: bool,

    /// `true` while at least one listener is attached for this role.
    pub connected: bool,

    /// `Instant` is Rust's monotonic clock, so a wall-clock jump can't
    /// expire (or resurrect) a reservation.
    pub last_seen: Instant,
}

impl Participant {
    /// Creates an unreserved participant for `role`.
    pub fn vacant(role: Role, now: Instant) -> Self {
        Self {
            role,
            token: String::new(),
            taken: false,
            connected: false,
            last_seen: now,
        }
    }

    /// Returns `true` if someone holds a token for this role.
    pub fn is_reserved(&self) -> bool {
        !self.token.is_empty()
    }

    /// Returns `true` if the reservation still blocks other claimants:
    /// the holder is connected, or was active less than `ttl` ago.
    pub fn is_active(&self, ttl: Duration, now: Instant) -> bool {
        self.connected || now.saturating_duration_since(self.last_seen) < ttl
    }

    /// The public projection of this record (no token).
    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            role: self.role,
            taken: self.taken,
            connected: self.connected,
        }
    }
}
