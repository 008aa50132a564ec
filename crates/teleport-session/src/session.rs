//! The per-session record.

use rand::Rng;
use teleport_lobby::{Lobby, LobbyConfig};
use teleport_protocol::{BlochState, Qubit, Role, SessionId, SessionSnapshot, StepInfo, StepKey};

use crate::bloch::{equator, random_hidden_state, NORTH};
use crate::steps::{self, Transition};
use crate::SessionError;

/// Result of a successful advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The session was already complete; nothing changed.
    Terminal,
    /// The session moved forward into this step.
    Entered(StepKey),
}

/// One teleportation session.
///
/// Owns the role lobby, the step cursor, the qubit records, the event log
/// and the hidden orientation every displayed orientation derives from.
/// Only [`Session::snapshot`] leaves this crate, and it never includes
/// the hidden value or any token.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    steps: Vec<StepInfo>,
    step_index: usize,
    lobby: Lobby,
    log: Vec<String>,
    qubits: Vec<Qubit>,
    hidden: BlochState,
}

impl Session {
    /// Creates a session at the first step with every role free and a
    /// freshly drawn hidden state.
    pub fn new(id: SessionId, config: LobbyConfig) -> Self {
        Self::with_rng(id, config, &mut rand::rng())
    }

    /// Like [`Session::new`], drawing the hidden state from `rng`.
    pub fn with_rng<R: Rng>(id: SessionId, config: LobbyConfig, rng: &mut R) -> Self {
        let hidden = random_hidden_state(rng);
        let qubits = vec![
            qubit("q1", Role::Alice, "unknown state", hidden),
            qubit("q2", Role::Bob, "clean state", NORTH),
            qubit("q3", Role::Charlie, "entangled pair", equator(hidden.phi)),
        ];

        Self {
            id,
            steps: steps::preset(),
            step_index: 0,
            lobby: Lobby::new(config),
            log: vec!["session created, roles are free".to_string()],
            qubits,
            hidden,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn lobby_mut(&mut self) -> &mut Lobby {
        &mut self.lobby
    }

    /// Appends an entry to the event log.
    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.log.push(entry.into());
    }

    /// Moves the session one step forward on behalf of `role`.
    ///
    /// Refreshes the actor's activity timestamp, logs the step entered and
    /// applies its qubit changes. At the terminal step this is a no-op.
    ///
    /// # Errors
    /// Returns [`SessionError::RoleNotPermittedForStep`] without touching
    /// anything if `role` may not advance the current step.
    pub fn advance(&mut self, role: Role) -> Result<Advance, SessionError> {
        let (to, entered) = match steps::decide(&self.steps, self.step_index, role)? {
            Transition::Terminal => return Ok(Advance::Terminal),
            Transition::Advance { to, entered } => (to, entered),
        };

        self.step_index = to;
        self.lobby.touch(role);

        let title = self.steps[to].title.clone();
        self.push_log(format!("step: {title}"));
        if let Some(extra) = steps::apply_entered(&mut self.qubits, self.hidden, entered) {
            self.push_log(extra);
        }

        Ok(Advance::Entered(entered))
    }

    /// The outward-facing copy of this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            step_index: self.step_index,
            steps: self.steps.clone(),
            qubits: self.qubits.clone(),
            log: self.log.clone(),
            participants: self.lobby.views(),
        }
    }

    #[cfg(test)]
    pub(crate) fn hidden(&self) -> BlochState {
        self.hidden
    }
}

fn qubit(id: &str, role: Role, state: &str, bloch: BlochState) -> Qubit {
    Qubit {
        id: id.to_string(),
        role,
        state: state.to_string(),
        bloch,
    }
}
