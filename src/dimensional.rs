//! Dimensional factors (C3): canonical non-dimensionalisation derived from the initial orbit.
//!
//! Grounded on `original_source/src/conversions/dimensional.cpp`'s `calculate_factors`,
//! `cartesian_nondimensionalise`, and `cartesian_dimensionalise`.

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;
use crate::state::{cartesian_rv, cartesian_state, State6};
use crate::vector::norm3;

/// `(length, velocity, time, grav)`, computed once from the initial Cartesian state and `mu`, and
/// immutable for the lifetime of one propagation (§3).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DimensionalFactors {
    pub length: f64,
    pub velocity: f64,
    pub time: f64,
    pub grav: f64,
}

/// Computes the four factors from the initial Cartesian state and `mu`. Polynomial states: the
/// factors are derived from the polynomial's constant-coefficient (representative) value; the
/// factors themselves remain real, matching §4.3.
pub fn compute_factors<S: Scalar>(state: &State6<S>, mu: &S) -> DimensionalFactors {
    let (r_vec, v_vec) = cartesian_rv(state);
    let r = norm3(&r_vec).representative();
    let v = norm3(&v_vec).representative();
    let mu_val = mu.representative();

    let length = 1.0 / (2.0 / r - v * v / mu_val);
    let velocity = (mu_val / length).sqrt();
    let time = (length.powi(3) / mu_val).sqrt();
    let grav = mu_val;

    DimensionalFactors {
        length,
        velocity,
        time,
        grav,
    }
}

/// Divides position by `length`, velocity by `velocity`.
pub fn nondimensionalise_cartesian<S: Scalar>(state: &State6<S>, factors: &DimensionalFactors) -> State6<S> {
    let (r, v) = cartesian_rv(state);
    let length = S::from_f64(factors.length);
    let velocity = S::from_f64(factors.velocity);
    cartesian_state(r.div_scalar(&length), v.div_scalar(&velocity))
}

/// Inverse of [`nondimensionalise_cartesian`].
pub fn dimensionalise_cartesian<S: Scalar>(state: &State6<S>, factors: &DimensionalFactors) -> State6<S> {
    let (r, v) = cartesian_rv(state);
    let length = S::from_f64(factors.length);
    let velocity = S::from_f64(factors.velocity);
    cartesian_state(r.scale(&length), v.scale(&velocity))
}

pub fn nondimensionalise_time<S: Scalar>(t: &S, factors: &DimensionalFactors) -> S {
    t.clone() / S::from_f64(factors.time)
}

pub fn dimensionalise_time<S: Scalar>(t: &S, factors: &DimensionalFactors) -> S {
    t.clone() * S::from_f64(factors.time)
}

pub fn nondimensionalise_mu<S: Scalar>(mu: &S, factors: &DimensionalFactors) -> S {
    mu.clone() / S::from_f64(factors.grav)
}

pub fn dimensionalise_mu<S: Scalar>(mu: &S, factors: &DimensionalFactors) -> S {
    mu.clone() * S::from_f64(factors.grav)
}
