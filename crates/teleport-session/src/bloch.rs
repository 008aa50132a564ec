//! Derived qubit orientations.
//!
//! Every orientation a client ever sees is computed here from the
//! session's hidden state. All functions are pure; only
//! [`random_hidden_state`] consumes randomness, and it's called once per
//! session.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use teleport_protocol::BlochState;

/// Display magnitude of a collapsed (measured) qubit.
pub const COLLAPSED_RADIUS: f64 = 0.68;

/// The canonical reference orientation: the north pole, `|0⟩`.
pub const NORTH: BlochState = BlochState {
    theta: 0.0,
    phi: 0.0,
    radius: 1.0,
};

/// Draws a hidden state uniformly from the middle 60% of the polar range
/// and the full azimuthal range.
///
/// Staying away from the poles keeps the measurement outcome (which
/// depends on the sign of `cos θ`) split between both poles across
/// sessions, instead of almost always landing on one of them.
pub fn random_hidden_state<R: Rng>(rng: &mut R) -> BlochState {
    let theta = 0.2 * PI + rng.random::<f64>() * 0.6 * PI;
    let phi = rng.random::<f64>() * TAU;
    BlochState {
        theta,
        phi,
        radius: 1.0,
    }
}

/// A pure state on the equator at azimuth `phi`, normalized into `[0, 2π)`.
pub fn equator(phi: f64) -> BlochState {
    BlochState {
        theta: PI / 2.0,
        phi: phi.rem_euclid(TAU),
        radius: 1.0,
    }
}

/// The result of measuring `hidden`: north pole when `cos θ ≥ 0`, south
/// pole otherwise, both with the reduced [`COLLAPSED_RADIUS`].
pub fn collapse(hidden: BlochState) -> BlochState {
    let theta = if hidden.theta.cos() >= 0.0 { 0.0 } else { PI };
    BlochState {
        theta,
        phi: 0.0,
        radius: COLLAPSED_RADIUS,
    }
}
