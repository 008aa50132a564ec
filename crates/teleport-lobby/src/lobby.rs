//! The lobby: the role → participant table of one session.
//!
//! The lobby is responsible for:
//! - Reserving roles (grant, renew, reclaim) and issuing tokens
//! - Resolving a presented token back to the role it proves
//! - Tracking which roles have a client attached
//! - Releasing roles on explicit leave
//!
//! # Concurrency note
//!
//! `Lobby` is NOT thread-safe by itself. It is a plain value owned by a
//! session record, and the session store serializes every access to it
//! behind one lock. Keeping it a plain value keeps the reservation rules
//! testable without any runtime.

use std::collections::BTreeMap;
use std::time::Instant;

use teleport_protocol::{ParticipantView, Role};

use crate::reservation::{self, Reservation};
use crate::{IdGenerator, LobbyConfig, LobbyError, Participant};

/// The participants of one session, one per role.
///
/// ## Lifecycle of a role
///
/// ```text
///  reserve() ──→ [taken] ──connect()──→ [taken, connected]
///      ↑            │  ↑                      │
///      │            │  └─────disconnect()─────┘
///      │            │
///      │        release()        (or reserve() by someone else
///      │            │             once disconnected past the TTL)
///      │            ▼
///      └─────── [free]
/// ```
#[derive(Debug, Clone)]
pub struct Lobby {
    /// Fully populated at creation with every [`Role`]. `BTreeMap` keeps
    /// iteration (and therefore serialization) in role order.
    participants: BTreeMap<Role, Participant>,

    config: LobbyConfig,
}

impl Lobby {
    /// Creates a lobby where every role is free.
    pub fn new(config: LobbyConfig) -> Self {
        let now = Instant::now();
        let participants = Role::ALL
            .into_iter()
            .map(|role| (role, Participant::vacant(role, now)))
            .collect();

        Self {
            participants,
            config,
        }
    }

    /// Reserves `role_name` for the caller.
    ///
    /// `presented` is a token from an earlier reservation, if the client
    /// has one. Presenting the current token renews the reservation
    /// without rotating it. A new token is generated before anything is
    /// mutated, so a generator failure leaves the lobby untouched.
    ///
    /// # Errors
    /// - [`LobbyError::RoleUnsupported`]: not one of the fixed roles
    /// - [`LobbyError::RoleAlreadyTaken`]: the current holder is still active
    /// - [`LobbyError::IdentifierGenerationFailed`]: no token could be issued
    pub fn reserve(
        &mut self,
        role_name: &str,
        presented: Option<&str>,
        ids: &dyn IdGenerator,
    ) -> Result<Reservation, LobbyError> {
        let role: Role = role_name
            .parse()
            .map_err(|_| LobbyError::RoleUnsupported(role_name.to_string()))?;
        let now = Instant::now();

        let participant = self
            .participants
            .get_mut(&role)
            .ok_or_else(|| LobbyError::RoleUnsupported(role_name.to_string()))?;

        let outcome =
            reservation::decide(participant, presented, self.config.reservation_ttl, now)?;

        if outcome.issues_token() {
            let token = ids.new_id()?;
            participant.token = token;
            participant.taken = true;
            participant.connected = false;
        }
        participant.last_seen = now;

        tracing::debug!(%role, ?outcome, "role reservation accepted");

        Ok(Reservation {
            role,
            token: participant.token.clone(),
            outcome,
        })
    }

    /// Finds the role whose current token equals `token`.
    ///
    /// Free roles carry an empty token, so an empty `token` never resolves.
    ///
    /// # Errors
    /// Returns [`LobbyError::UnknownToken`] if no participant holds it.
    pub fn resolve(&self, token: &str) -> Result<Role, LobbyError> {
        if token.is_empty() {
            return Err(LobbyError::UnknownToken);
        }
        self.participants
            .values()
            .find(|p| p.token == token)
            .map(|p| p.role)
            .ok_or(LobbyError::UnknownToken)
    }

    /// Marks `role` as having an attached client.
    pub fn connect(&mut self, role: Role) {
        if let Some(p) = self.participants.get_mut(&role) {
            // A free role has nobody to connect.
            p.connected = p.is_reserved();
            p.last_seen = Instant::now();
        }
    }

    /// Marks `role` as having no attached client. The reservation itself
    /// survives; the TTL starts counting from now.
    pub fn disconnect(&mut self, role: Role) {
        if let Some(p) = self.participants.get_mut(&role) {
            p.connected = false;
            p.last_seen = Instant::now();
        }
    }

    /// Refreshes the activity timestamp of `role`.
    pub fn touch(&mut self, role: Role) {
        if let Some(p) = self.participants.get_mut(&role) {
            p.last_seen = Instant::now();
        }
    }

    /// Frees `role`: clears the token and both flags. The old token stops
    /// resolving immediately.
    pub fn release(&mut self, role: Role) {
        if let Some(p) = self.participants.get_mut(&role) {
            p.token.clear();
            p.taken = false;
            p.connected = false;
            p.last_seen = Instant::now();
            tracing::debug!(%role, "role released");
        }
    }

    /// Looks up the participant record of `role`.
    pub fn participant(&self, role: Role) -> Option<&Participant> {
        self.participants.get(&role)
    }

    /// The public projection of every participant, in role order.
    pub fn views(&self) -> BTreeMap<Role, ParticipantView> {
        self.participants
            .iter()
            .map(|(role, p)| (*role, p.view()))
            .collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
