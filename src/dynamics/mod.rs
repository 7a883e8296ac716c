//! Right-hand sides: the Cowell derivative (C8) and the GEqOE derivative (C9).
//!
//! Grounded on `original_source/src/propagators/cowell.cpp` and `propagators/geqoe.cpp`
//! (`derivative` in each). The GEqOE expressions (§4.9) are reproduced term-for-term per the
//! spec's instruction that any algebraic rearrangement changes the floating-point footprint.

use crate::perturbations::{EvalContext, Perturbation};
use crate::scalar::Scalar;
use crate::state::{cartesian_rv, cartesian_state, State6};
use crate::transforms::geqoe::geqoe_to_cartesian;
use crate::vector::{cross3, dot3, norm3, Vec3};

/// Ṙ = V; V̇ = −μR/r³ + P.total(t, R, V). Computed in this exact order so repeated runs produce
/// identical bit patterns (§4.8).
pub fn cowell_rhs<S: Scalar, P: Perturbation<S>>(
    t: &S,
    state: &State6<S>,
    mu: &S,
    perturbation: &P,
    ctx: &EvalContext,
) -> State6<S> {
    let (r_vec, v_vec) = cartesian_rv(state);
    let r = norm3(&r_vec);
    let r3 = r.clone() * r.clone() * r;

    let gravity = r_vec.scale(&(-mu.clone() / r3));
    let perturb = perturbation.total_acceleration(t, &r_vec, &v_vec, ctx);
    let accel = gravity.add(&perturb);

    cartesian_state(v_vec, accel)
}

/// The GEqOE derivative (§4.9). Reconstructs Cartesian state via the inverse transform to
/// evaluate the perturbation, then differentiates each of the six elements.
pub fn geqoe_rhs<S: Scalar, P: Perturbation<S>>(
    t: &S,
    geqoe: &State6<S>,
    mu: &S,
    perturbation: &P,
    ctx: &EvalContext,
) -> Result<State6<S>, crate::error::CoreError> {
    let [nu, p1, p2, _l, q1, q2] = geqoe.clone();

    let cartesian = geqoe_to_cartesian(t, geqoe, mu, perturbation, ctx)?;
    let (r_vec, v_vec) = cartesian_rv(&cartesian);
    let r = norm3(&r_vec);

    let u = perturbation.potential(t, &r_vec, ctx);
    let ut = perturbation.potential_time_derivative(t, &r_vec, &v_vec, ctx);
    let f_total = perturbation.total_acceleration(t, &r_vec, &v_vec, ctx);
    let f_np = perturbation.nonpotential_acceleration(t, &r_vec, &v_vec, ctx);

    // eps_dot = Ut + F_np . V
    let eps_dot = ut + dot3(&f_np, &v_vec);

    // nu_dot = -3 (nu/mu^2)^(1/3) eps_dot
    let nu_dot = S::from_f64(-3.0) * (nu.clone() / (mu.clone() * mu.clone())).powf(1.0 / 3.0) * eps_dot.clone();

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
    let e_r = r_vec.div_scalar(&r);

    let cos_l = dot3(&e_r, &e_x);
    let sin_l = dot3(&e_r, &e_y);

    let h_vec = cross3(&r_vec, &v_vec);
    let h = norm3(&h_vec);
    let e_h = h_vec.div_scalar(&h);

    let c = (mu.clone() * mu.clone() / nu.clone()).powf(1.0 / 3.0)
        * (S::one() - p1.clone() * p1.clone() - p2.clone() * p2.clone()).sqrt();

    let h_wh = q1.clone() * cos_l.clone() - q2.clone() * sin_l.clone();
    let p = c.clone() * c.clone() / mu.clone();
    let zeta = r.clone() / p;
    let zeta_tilde = S::one() + zeta.clone();
    let f_r = dot3(&f_total, &e_r);
    let f_h = dot3(&f_total, &e_h);

    let rdot = dot3(&r_vec, &v_vec) / r.clone();
    let two_u_minus_rfr = S::from_f64(2.0) * u.clone() - r.clone() * f_r;

    // p1_dot
    let p1_dot = p2.clone()
        * ((h.clone() - c.clone()) / (r.clone() * r.clone()) - (r.clone() / h.clone()) * h_wh.clone() * f_h.clone())
        + (S::one() / c.clone())
            * (r.clone() * rdot.clone() * p1.clone() / c.clone() + zeta_tilde.clone() * p2.clone() + zeta.clone() * cos_l.clone())
            * two_u_minus_rfr.clone()
        + (r.clone() / mu.clone()) * (zeta.clone() * p1.clone() + zeta_tilde.clone() * sin_l.clone()) * eps_dot.clone();

    // p2_dot
    let p2_dot = p1.clone()
        * ((r.clone() / h.clone()) * h_wh.clone() * f_h.clone() - (h.clone() - c.clone()) / (r.clone() * r.clone()))
        + (S::one() / c.clone())
            * (r.clone() * rdot.clone() * p2.clone() / c.clone() - zeta_tilde.clone() * p1.clone() - zeta.clone() * sin_l.clone())
            * two_u_minus_rfr.clone()
        + (r.clone() / mu.clone()) * (zeta.clone() * p2.clone() + zeta_tilde.clone() * cos_l.clone()) * eps_dot.clone();

    // L_dot
    let a = (mu.clone() / (nu.clone() * nu.clone())).powf(1.0 / 3.0);
    let alpha = S::one() / (S::one() + (S::one() - p1.clone() * p1.clone() - p2.clone() * p2.clone()).sqrt());
    let l_dot = nu.clone() + (h.clone() - c.clone()) / (r.clone() * r.clone()) - (r.clone() / h.clone()) * h_wh * f_h.clone()
        + (r.clone() * rdot * c.clone() * zeta_tilde / (mu.clone() * mu.clone())) * alpha.clone() * eps_dot
        + (S::one() / c.clone()) * (S::one() / alpha.clone() + alpha * (S::one() - r.clone() / a)) * two_u_minus_rfr;

    // q1_dot, q2_dot
    let q_fac = r.clone() / (S::from_f64(2.0) * h) * f_h * (S::one() + q1.clone() * q1.clone() + q2.clone() * q2.clone());
    let q1_dot = q_fac.clone() * sin_l;
    let q2_dot = q_fac * cos_l;

    Ok([nu_dot, p1_dot, p2_dot, l_dot, q1_dot, q2_dot])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensional::DimensionalFactors;
    use crate::perturbations::Combiner;

    #[test]
    fn cowell_rhs_matches_two_body_acceleration() {
        let mu = 398600.4418_f64;
        let state: State6<f64> = [7000.0, 0.0, 0.0, 0.0, 7.5, 0.0];
        let pert = Combiner::new();
        let factors = DimensionalFactors {
            length: 1.0,
            velocity: 1.0,
            time: 1.0,
            grav: mu,
        };
        let ctx = EvalContext {
            factors: &factors,
            nondimensional: false,
        };
        let dxdt = cowell_rhs(&0.0, &state, &mu, &pert, &ctx);
        assert!((dxdt[0] - 0.0).abs() < 1e-12);
        assert!((dxdt[3] - (-mu / (7000.0 * 7000.0))).abs() < 1e-9);
    }

    #[test]
    fn geqoe_rhs_conserves_nu_with_no_perturbation() {
        use crate::transforms::geqoe::cartesian_to_geqoe;

        let mu = 398600.4418_f64;
        let state: State6<f64> = [7000.0, 1500.0, 300.0, -1.0, 7.0, 1.5];
        let pert = Combiner::new();
        let factors = DimensionalFactors {
            length: 1.0,
            velocity: 1.0,
            time: 1.0,
            grav: mu,
        };
        let ctx = EvalContext {
            factors: &factors,
            nondimensional: false,
        };
        let geqoe = cartesian_to_geqoe(&0.0, &state, &mu, &pert, &ctx).unwrap();
        let dxdt = geqoe_rhs(&0.0, &geqoe, &mu, &pert, &ctx).unwrap();
        assert!(dxdt[0].abs() < 1e-12, "nu_dot should vanish with no perturbation");
    }
}
