//! Cartesian<->GEqOE transform (C6) — the regularised element set and its nonlinear inversion.
//!
//! Grounded on `original_source/src/conversions/geqoe.cpp`: `cartesian_to_geqoe` and
//! `geqoe_to_cartesian`.

use crate::error::CoreError;
use crate::perturbations::{EvalContext, Perturbation};
use crate::roots::newton_raphson_default;
use crate::scalar::Scalar;
use crate::state::{cartesian_rv, cartesian_state, State6};
use crate::vector::{dot3, norm3, Vec3};

/// The equinoctial basis `(e_x, e_y)` built from the plane parameters `(q1, q2)` (§4.6 step 7 /
/// §4.6 GEqOE->Cartesian step 5). Shared by both directions of the transform.
fn equinoctial_basis<S: Scalar>(q1: &S, q2: &S) -> (Vec3<S>, Vec3<S>) {
    let efac = S::one() / (S::one() + q1.clone() * q1.clone() + q2.clone() * q2.clone());
    let e_x = Vec3::new(
        efac.clone() * (S::one() - q1.clone() * q1.clone() + q2.clone() * q2.clone()),
        efac.clone() * (S::from_f64(2.0) * q1.clone() * q2.clone()),
        efac.clone() * (S::from_f64(-2.0) * q1.clone()),
    );
    let e_y = Vec3::new(
        efac.clone() * (S::from_f64(2.0) * q1.clone() * q2.clone()),
        efac.clone() * (S::one() + q1.clone() * q1.clone() - q2.clone() * q2.clone()),
        efac * (S::from_f64(2.0) * q2.clone()),
    );
    (e_x, e_y)
}

/// Cartesian -> GEqOE (§4.6). Fails with [`CoreError::TransformDomainError`] if the computed
/// specific energy is non-negative (the orbit is unbound, so `nu` cannot be formed).
pub fn cartesian_to_geqoe<S: Scalar, P: Perturbation<S>>(
    t: &S,
    state: &State6<S>,
    mu: &S,
    perturbation: &P,
    ctx: &EvalContext,
) -> Result<State6<S>, CoreError> {
    let (r_vec, v_vec) = cartesian_rv(state);
    let r = norm3(&r_vec);
    let rdot = dot3(&r_vec, &v_vec) / r.clone();

    let h_vec = crate::vector::cross3(&r_vec, &v_vec);
    let h = norm3(&h_vec);

    let u = perturbation.potential(t, &r_vec, ctx);
    let u_eff = h.clone() * h.clone() / (S::from_f64(2.0) * r.clone() * r.clone()) + u.clone();

    let eps = S::from_f64(0.5) * rdot.clone() * rdot.clone() - mu.clone() / r.clone() + u_eff.clone();
    if eps.representative() >= 0.0 {
        return Err(CoreError::TransformDomainError {
            reason: "specific energy is non-negative; orbit is unbound".to_string(),
        });
    }
    let nu = (S::from_f64(-2.0) * eps).powf(1.5) / mu.clone();

    let q1 = h_vec.x.clone() / (h.clone() + h_vec.z.clone());
    let q2 = -(h_vec.y.clone()) / (h.clone() + h_vec.z.clone());
    let (e_x, e_y) = equinoctial_basis(&q1, &q2);

    let e_r = r_vec.div_scalar(&r);
    let cos_l = dot3(&e_r, &e_x);
    let sin_l = dot3(&e_r, &e_y);

    let c = (S::from_f64(2.0) * r.clone() * r.clone() * u_eff).sqrt();
    let p = c.clone() * c.clone() / mu.clone();

    let p1 = (p.clone() / r.clone() - S::one()) * sin_l.clone()
        - (c.clone() * rdot.clone() / mu.clone()) * cos_l.clone();
    let p2 = (p / r.clone() - S::one()) * cos_l.clone()
        + (c.clone() * rdot.clone() / mu.clone()) * sin_l.clone();

    let a = (mu.clone() / (nu.clone() * nu.clone())).powf(1.0 / 3.0);
    let w = (mu.clone() / a).sqrt();

    let mu_plus_cw = mu.clone() + c.clone() * w.clone();
    let c_plus_wr = c + w * r.clone();
    let bracket = mu_plus_cw.clone() - r * rdot.clone() * rdot.clone();
    let s_big = bracket.clone() * sin_l.clone() - rdot.clone() * c_plus_wr.clone() * cos_l.clone();
    let c_big = bracket * cos_l + rdot * c_plus_wr * sin_l;

    let l = s_big.clone().atan2(&c_big.clone()) + (c_big * p1.clone() - s_big * p2.clone()) / mu_plus_cw;

    Ok([nu, p1, p2, l, q1, q2])
}

/// GEqOE -> Cartesian (§4.6). Fails with [`CoreError::TransformDomainError`] when `nu <= 0`,
/// `1 - p1^2 - p2^2 <= 0`, or `c^2 < 2 r^2 U`.
pub fn geqoe_to_cartesian<S: Scalar, P: Perturbation<S>>(
    t: &S,
    geqoe: &State6<S>,
    mu: &S,
    perturbation: &P,
    ctx: &EvalContext,
) -> Result<State6<S>, CoreError> {
    let [nu, p1, p2, l, q1, q2] = geqoe.clone();

    if nu.representative() <= 0.0 {
        return Err(CoreError::TransformDomainError {
            reason: "nu <= 0".to_string(),
        });
    }

    let disc = S::one() - p1.clone() * p1.clone() - p2.clone() * p2.clone();
    if disc.representative() <= 0.0 {
        return Err(CoreError::TransformDomainError {
            reason: "1 - p1^2 - p2^2 <= 0".to_string(),
        });
    }

    let f = |k: &S| k.clone() + p1.clone() * k.cos() - p2.clone() * k.sin() - l.clone();
    let df = |k: &S| S::one() - p1.clone() * k.sin() - p2.clone() * k.cos();
    let k = newton_raphson_default(f, df, l.clone())?;

    let a = (mu.clone() / (nu.clone() * nu.clone())).powf(1.0 / 3.0);
    let r = a.clone() * (S::one() - p1.clone() * k.sin() - p2.clone() * k.cos());
    let rdot = (mu.clone() * a.clone()).sqrt() / r.clone() * (p2.clone() * k.sin() - p1.clone() * k.cos());

    let sqrt_disc = disc.sqrt();
    let alpha = S::one() / (S::one() + sqrt_disc);

    let a_over_r = a.clone() / r.clone();
    let sin_l = a_over_r.clone()
        * (alpha.clone() * p1.clone() * p2.clone() * k.cos() + (S::one() - alpha.clone() * p2.clone() * p2.clone()) * k.sin()
            - p1.clone());
    let cos_l = a_over_r
        * (alpha.clone() * p1.clone() * p2.clone() * k.sin() + (S::one() - alpha * p1.clone() * p1.clone()) * k.cos()
            - p2.clone());

    let (e_x, e_y) = equinoctial_basis(&q1, &q2);
    let e_r = Vec3::new(
        e_x.x.clone() * cos_l.clone() + e_y.x.clone() * sin_l.clone(),
        e_x.y.clone() * cos_l.clone() + e_y.y.clone() * sin_l.clone(),
        e_x.z.clone() * cos_l.clone() + e_y.z.clone() * sin_l.clone(),
    );
    let e_f = Vec3::new(
        e_y.x.clone() * cos_l.clone() - e_x.x.clone() * sin_l.clone(),
        e_y.y.clone() * cos_l.clone() - e_x.y.clone() * sin_l.clone(),
        e_y.z * cos_l - e_x.z * sin_l,
    );

    let r_vec = e_r.scale(&r);

    let c = (mu.clone() * mu.clone() / nu).powf(1.0 / 3.0) * disc.sqrt();
    let u = perturbation.potential(t, &r_vec, ctx);
    let h_sq = c.clone() * c - S::from_f64(2.0) * r.clone() * r.clone() * u;
    if h_sq.representative() < 0.0 {
        return Err(CoreError::TransformDomainError {
            reason: "c^2 < 2 r^2 U".to_string(),
        });
    }
    let h = h_sq.sqrt();

    let v_vec = e_r.scale(&rdot).add(&e_f.scale(&(h / r)));

    Ok(cartesian_state(r_vec, v_vec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensional::DimensionalFactors;
    use crate::perturbations::Combiner;

    fn no_perturbation() -> Combiner<f64> {
        Combiner::new()
    }

    fn identity_ctx(factors: &DimensionalFactors) -> EvalContext {
        EvalContext {
            factors,
            nondimensional: false,
        }
    }

    #[test]
    fn round_trip_general_orbit() {
        let mu = 398600.4418_f64;
        let state: State6<f64> = [7000.0, 1500.0, 300.0, -1.0, 7.0, 1.5];
        let pert = no_perturbation();
        let factors = DimensionalFactors {
            length: 1.0,
            velocity: 1.0,
            time: 1.0,
            grav: mu,
        };
        let ctx = identity_ctx(&factors);

        let geqoe = cartesian_to_geqoe(&0.0, &state, &mu, &pert, &ctx).unwrap();
        let back = geqoe_to_cartesian(&0.0, &geqoe, &mu, &pert, &ctx).unwrap();
        for i in 0..6 {
            assert!((back[i] - state[i]).abs() <= state[i].abs() * 1e-8 + 1e-8);
        }
    }

    #[test]
    fn unbound_state_is_rejected() {
        let mu = 398600.4418_f64;
        // escape velocity at r=7000km is ~10.7 km/s; use well above that.
        let state: State6<f64> = [7000.0, 0.0, 0.0, 0.0, 15.0, 0.0];
        let pert = no_perturbation();
        let factors = DimensionalFactors {
            length: 1.0,
            velocity: 1.0,
            time: 1.0,
            grav: mu,
        };
        let ctx = identity_ctx(&factors);
        let result = cartesian_to_geqoe(&0.0, &state, &mu, &pert, &ctx);
        assert!(matches!(result, Err(CoreError::TransformDomainError { .. })));
    }

    #[test]
    fn non_physical_eccentricity_is_rejected() {
        let mu = 398600.4418_f64;
        let geqoe: State6<f64> = [0.001, 2.0, 2.0, 0.1, 0.0, 0.0];
        let pert = no_perturbation();
        let factors = DimensionalFactors {
            length: 1.0,
            velocity: 1.0,
            time: 1.0,
            grav: mu,
        };
        let ctx = identity_ctx(&factors);
        let result = geqoe_to_cartesian(&0.0, &geqoe, &mu, &pert, &ctx);
        assert!(matches!(result, Err(CoreError::TransformDomainError { .. })));
    }
}
