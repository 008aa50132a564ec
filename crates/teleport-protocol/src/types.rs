//! Core protocol types for Teleport's wire format.
//!
//! Everything in this module is something a client can see: the session
//! snapshot returned by the REST endpoints, the messages pushed over the
//! streaming channel, and the request/response bodies of the HTTP API.
//!
//! Nothing here carries a reservation token or the session's hidden
//! orientation. Those live in the lobby and session crates and never reach
//! a serializer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A participant slot in the teleportation exchange.
///
/// The role set is fixed: every session has exactly these three slots,
/// populated at creation and never added or removed.
///
/// `#[serde(rename_all = "lowercase")]` gives the JSON names `"alice"`,
/// `"bob"` and `"charlie"`. Because `Role` is a unit-only enum, serde can
/// also use it as a JSON object key, which is how the participant map in
/// [`SessionSnapshot`] is encoded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Holds the unknown state that gets teleported.
    Alice,
    /// Receives the state at the end of the exchange.
    Bob,
    /// Prepares the entangled pair.
    Charlie,
}

impl Role {
    /// Every role, in qubit order (`q1`, `q2`, `q3`).
    pub const ALL: [Role; 3] = [Role::Alice, Role::Bob, Role::Charlie];

    /// The lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alice => "alice",
            Self::Bob => "bob",
            Self::Charlie => "charlie",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a role name case-insensitively, so `"Alice"` and `"ALICE"` are
/// both accepted. Leading and trailing whitespace is ignored.
impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == name)
            .ok_or_else(|| ProtocolError::UnknownRole(s.to_string()))
    }
}

/// A globally unique session identifier.
///
/// The string is opaque to everyone except the identifier generator that
/// produced it. `#[serde(transparent)]` keeps it a bare string in JSON.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The key of one stage of the teleportation protocol.
///
/// The declaration order is the protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Entangle,
    Combine,
    Measure,
    SendClassical,
    Reconstruct,
    Complete,
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entangle => "entangle",
            Self::Combine => "combine",
            Self::Measure => "measure",
            Self::SendClassical => "send_classical",
            Self::Reconstruct => "reconstruct",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Human-readable context for a protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub key: StepKey,
    pub title: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Qubits
// ---------------------------------------------------------------------------

/// Spherical coordinates of a qubit on the Bloch sphere.
///
/// Angles are radians. `radius` is purely visual: 1.0 is a pure state,
/// anything shorter depicts a collapsed or decohered one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlochState {
    /// Polar angle, `0..=π`.
    pub theta: f64,
    /// Azimuthal angle, `0..2π`.
    pub phi: f64,
    pub radius: f64,
}

/// One qubit record as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qubit {
    pub id: String,
    /// The role that owns this qubit. A listener's local view shows the
    /// label of the qubit owned by its role.
    pub role: Role,
    /// Display label, e.g. `"measured"`.
    pub state: String,
    pub bloch: BlochState,
}

// ---------------------------------------------------------------------------
// Session snapshot
// ---------------------------------------------------------------------------

/// The public projection of a participant: whether the role is reserved
/// and whether a client is currently attached. The token is deliberately
/// absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub role: Role,
    pub taken: bool,
    pub connected: bool,
}

/// A full, outward-facing copy of one session's global state.
///
/// `#[serde(rename_all = "camelCase")]` turns `step_index` into
/// `stepIndex` in JSON, which is what browser clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub step_index: usize,
    pub steps: Vec<StepInfo>,
    pub qubits: Vec<Qubit>,
    pub log: Vec<String>,
    pub participants: BTreeMap<Role, ParticipantView>,
}

impl SessionSnapshot {
    /// The step the session is currently on.
    pub fn current_step(&self) -> Option<&StepInfo> {
        self.steps.get(self.step_index)
    }

    /// The display label of the qubit owned by `role`, or an empty string
    /// if no qubit is bound to it.
    pub fn label_for(&self, role: Role) -> &str {
        self.qubits
            .iter()
            .find(|q| q.role == role)
            .map(|q| q.state.as_str())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Streaming messages
// ---------------------------------------------------------------------------

/// The role-scoped part of a pushed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalView {
    pub role: Role,
    /// Label of the qubit owned by `role`.
    pub state: String,
}

impl LocalView {
    /// Builds the local view of `role` from a snapshot.
    pub fn of(snapshot: &SessionSnapshot, role: Role) -> Self {
        Self {
            role,
            state: snapshot.label_for(role).to_string(),
        }
    }
}

/// Messages the server pushes over the streaming channel.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` produces the
/// internally tagged shape clients switch on:
/// `{ "type": "state_update", "global": {...}, "local": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on a freshly attached channel.
    Joined {
        global: SessionSnapshot,
        local: LocalView,
    },

    /// Sent to every listener of a session after each committed mutation.
    StateUpdate {
        global: SessionSnapshot,
        local: LocalView,
    },

    /// The channel could not be attached, or is about to be closed.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// HTTP bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/sessions/{id}/join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub role: String,
    /// A token from an earlier join, presented to resume the reservation.
    #[serde(default)]
    pub token: Option<String>,
}

/// Response of a successful join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub token: String,
    pub role: Role,
}

/// Body of the advance and leave endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SessionSnapshot {
        let mut participants = BTreeMap::new();
        for role in Role::ALL {
            participants.insert(
                role,
                ParticipantView {
                    role,
                    taken: role == Role::Bob,
                    connected: false,
                },
            );
        }
        SessionSnapshot {
            id: SessionId::from("abc"),
            step_index: 0,
            steps: vec![StepInfo {
                key: StepKey::Entangle,
                title: "Entangle".into(),
                description: "Charlie prepares a pair.".into(),
            }],
            qubits: vec![Qubit {
                id: "q2".into(),
                role: Role::Bob,
                state: "clean state".into(),
                bloch: BlochState {
                    theta: 0.0,
                    phi: 0.0,
                    radius: 1.0,
                },
            }],
            log: vec!["created".into()],
            participants,
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("alice".parse::<Role>().unwrap(), Role::Alice);
        assert_eq!("BOB".parse::<Role>().unwrap(), Role::Bob);
        assert_eq!(" Charlie ".parse::<Role>().unwrap(), Role::Charlie);
    }

    #[test]
    fn test_role_parse_unknown_returns_error() {
        let err = "eve".parse::<Role>().unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownRole(ref name) if name == "eve"));
    }

    #[test]
    fn test_role_json_is_lowercase() {
        let json = serde_json::to_value(Role::Charlie).unwrap();
        assert_eq!(json, "charlie");
    }

    #[test]
    fn test_step_key_json_is_snake_case() {
        let json = serde_json::to_value(StepKey::SendClassical).unwrap();
        assert_eq!(json, "send_classical");
        assert_eq!(StepKey::SendClassical.to_string(), "send_classical");
    }

    #[test]
    fn test_snapshot_json_format() {
        let json = serde_json::to_value(snapshot()).unwrap();

        assert_eq!(json["id"], "abc");
        assert_eq!(json["stepIndex"], 0);
        assert_eq!(json["steps"][0]["key"], "entangle");
        assert_eq!(json["participants"]["bob"]["taken"], true);
        assert_eq!(json["participants"]["alice"]["connected"], false);
        assert!(json["participants"]["bob"].get("token").is_none());
    }

    #[test]
    fn test_snapshot_label_for_missing_role_is_empty() {
        let snap = snapshot();
        assert_eq!(snap.label_for(Role::Bob), "clean state");
        assert_eq!(snap.label_for(Role::Alice), "");
    }

    #[test]
    fn test_server_message_state_update_json_format() {
        let snap = snapshot();
        let msg = ServerMessage::StateUpdate {
            local: LocalView::of(&snap, Role::Bob),
            global: snap,
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "state_update");
        assert_eq!(json["local"]["role"], "bob");
        assert_eq!(json["local"]["state"], "clean state");
        assert_eq!(json["global"]["id"], "abc");
    }

    #[test]
    fn test_server_message_joined_tag() {
        let snap = snapshot();
        let msg = ServerMessage::Joined {
            local: LocalView::of(&snap, Role::Alice),
            global: snap,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "joined");
    }

    #[test]
    fn test_join_request_token_defaults_to_none() {
        let req: JoinRequest = serde_json::from_str(r#"{"role": "alice"}"#).unwrap();
        assert_eq!(req.role, "alice");
        assert!(req.token.is_none());
    }

    #[test]
    fn test_token_request_missing_token_is_empty() {
        let req: TokenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.token.is_empty());
    }

    #[test]
    fn test_decode_unknown_message_type_returns_error() {
        let unknown = r#"{"type": "teleport_now"}"#;
        let result: Result<ServerMessage, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }
}
