//! The six-scalar state vector shared by both formulations (§3).
//!
//! A Cartesian state is a pair of triples `(R, V)`; a GEqOE state is the six-tuple `(nu, p1, p2,
//! L, q1, q2)`. Both are represented as the same flat `State6<S>` so the propagator driver (C10)
//! can be generic over which formulation it is integrating.

use crate::scalar::Scalar;
use crate::vector::Vec3;

/// Always six scalar entries in a fixed order: `(x, y, z, xdot, ydot, zdot)` for Cartesian, or
/// `(nu, p1, p2, L, q1, q2)` for GEqOE.
pub type State6<S> = [S; 6];

/// The state shape a given `State6<S>` is carrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateShape {
    Cartesian,
    GEqOE,
}

impl StateShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateShape::Cartesian => "Cartesian",
            StateShape::GEqOE => "GEqOE",
        }
    }
}

/// Splits a Cartesian `State6` into its position and velocity triples.
pub fn cartesian_rv<S: Scalar>(state: &State6<S>) -> (Vec3<S>, Vec3<S>) {
    let r = Vec3::new(state[0].clone(), state[1].clone(), state[2].clone());
    let v = Vec3::new(state[3].clone(), state[4].clone(), state[5].clone());
    (r, v)
}

/// Assembles a Cartesian `State6` from position and velocity triples.
pub fn cartesian_state<S: Scalar>(r: Vec3<S>, v: Vec3<S>) -> State6<S> {
    [r.x, r.y, r.z, v.x, v.y, v.z]
}
