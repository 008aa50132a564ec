//! The step state machine.
//!
//! States are indices into the fixed step sequence. Transitions only go
//! forward, one step at a time, and each step names the single role that
//! may move the session out of it:
//!
//! ```text
//! Entangle ─C→ Combine ─A→ Measure ─A→ SendClassical ─B→ Reconstruct ─B→ Complete
//! ```
//!
//! `Complete` is terminal. Asking to advance there is not an error; it is
//! a no-op.

use teleport_protocol::{BlochState, Qubit, Role, StepInfo, StepKey};

use crate::bloch::{collapse, equator};
use crate::SessionError;

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// The step sequence every session starts with.
///
/// Returns a fresh `Vec` on every call. Each session owns its copy, so
/// changing the preset never alters a session that already exists.
pub fn preset() -> Vec<StepInfo> {
    [
        (
            StepKey::Entangle,
            "Preparing the entangled pair",
            "Charlie creates a pair of qubits and sends one to Alice and one to Bob.",
        ),
        (
            StepKey::Combine,
            "Combining states",
            "Alice joins her unknown qubit with the entangled particle she received.",
        ),
        (
            StepKey::Measure,
            "Alice's measurement",
            "Alice performs a joint measurement, destroying the original state.",
        ),
        (
            StepKey::SendClassical,
            "Classical transmission",
            "The measurement results travel to Bob over an ordinary channel.",
        ),
        (
            StepKey::Reconstruct,
            "Bob's reconstruction",
            "Bob applies corrections and obtains Alice's state.",
        ),
        (
            StepKey::Complete,
            "Done",
            "The state has been transferred and the original destroyed.",
        ),
    ]
    .into_iter()
    .map(|(key, title, description)| StepInfo {
        key,
        title: title.to_string(),
        description: description.to_string(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// The role allowed to advance the session out of `step`, if any.
pub fn permitted_role(step: StepKey) -> Option<Role> {
    match step {
        StepKey::Entangle => Some(Role::Charlie),
        StepKey::Combine | StepKey::Measure => Some(Role::Alice),
        StepKey::SendClassical | StepKey::Reconstruct => Some(Role::Bob),
        StepKey::Complete => None,
    }
}

/// What an advance request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Already at the last step. Nothing changes.
    Terminal,
    /// Move to index `to`, entering step `entered`.
    Advance { to: usize, entered: StepKey },
}

/// Decides whether `role` may advance a session sitting at `index`.
///
/// Pure: looks at the step table only.
///
/// # Errors
/// Returns [`SessionError::RoleNotPermittedForStep`] if `role` is not the
/// one named for the current step.
pub fn decide(steps: &[StepInfo], index: usize, role: Role) -> Result<Transition, SessionError> {
    let next = index + 1;
    let (Some(current), Some(entering)) = (steps.get(index), steps.get(next)) else {
        return Ok(Transition::Terminal);
    };

    if permitted_role(current.key) != Some(role) {
        return Err(SessionError::RoleNotPermittedForStep {
            role,
            step: current.key,
        });
    }

    Ok(Transition::Advance {
        to: next,
        entered: entering.key,
    })
}

// ---------------------------------------------------------------------------
// Derived state
// ---------------------------------------------------------------------------

/// Applies the qubit changes that come with entering `entered`.
///
/// Everything is derived from `hidden`, so replaying the same step on the
/// same session gives the same result. Returns an extra log line for steps
/// that have one.
pub fn apply_entered(
    qubits: &mut [Qubit],
    hidden: BlochState,
    entered: StepKey,
) -> Option<&'static str> {
    match entered {
        StepKey::Entangle => {
            update(qubits, Role::Charlie, Some("pair ready"), equator(hidden.phi));
            update(qubits, Role::Bob, None, equator(hidden.phi + std::f64::consts::FRAC_PI_2));
            None
        }
        StepKey::Combine => {
            if let Some(q) = qubit_mut(qubits, Role::Alice) {
                q.state = "linked to pair".to_string();
            }
            update(
                qubits,
                Role::Charlie,
                None,
                equator(hidden.phi + std::f64::consts::FRAC_PI_3),
            );
            None
        }
        StepKey::Measure => {
            update(qubits, Role::Alice, Some("measured"), collapse(hidden));
            None
        }
        StepKey::SendClassical => Some("classical bits sent to bob"),
        StepKey::Reconstruct => {
            update(qubits, Role::Bob, Some("receiving correction"), hidden);
            None
        }
        StepKey::Complete => {
            update(qubits, Role::Bob, Some("state restored"), hidden);
            None
        }
    }
}

fn qubit_mut(qubits: &mut [Qubit], role: Role) -> Option<&mut Qubit> {
    qubits.iter_mut().find(|q| q.role == role)
}

fn update(qubits: &mut [Qubit], role: Role, label: Option<&str>, bloch: BlochState) {
    if let Some(q) = qubit_mut(qubits, role) {
        if let Some(label) = label {
            q.state = label.to_string();
        }
        q.bloch = bloch;
    }
}
