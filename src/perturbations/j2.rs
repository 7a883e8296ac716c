//! J2 gravitational perturbation, a concrete [`super::Perturbation`] example.
//!
//! Grounded on `original_source/src/perturbations/geopotential/J2.cpp`.

use crate::scalar::Scalar;
use crate::vector::{norm3, Vec3};

use super::{EvalContext, Perturbation};

/// `U = (1/2) J2 mu r_planet^2 (3 cos^2(phi) - 1) / r^3`, `cos(phi) = z/r`.
///
/// `j2` is a required constructor argument rather than a hard-coded literal: the source header
/// value (`1.082635854e-3`) and its reference-run value (`1.082626111e-3`) disagree, and baking
/// either one in would silently pick a side. `constants::earth::J2`/`J2_REF` are offered as named
/// constants a caller may pass here.
pub struct J2Perturbation {
    pub mu: f64,
    pub r_planet: f64,
    pub j2: f64,
}

impl J2Perturbation {
    pub fn new(mu: f64, r_planet: f64, j2: f64) -> Self {
        Self { mu, r_planet, j2 }
    }
}

impl<S: Scalar> Perturbation<S> for J2Perturbation {
    fn total_acceleration(&self, _t: &S, r: &Vec3<S>, _v: &Vec3<S>, ctx: &EvalContext) -> Vec3<S> {
        let (mu, r_planet) = self.scaled(ctx);
        let r_norm = norm3(r);
        let r2 = r_norm.clone() * r_norm.clone();
        let z2_over_r2 = r.z.clone() * r.z.clone() / r2.clone();

        let fac = S::from_f64(-1.5) * S::from_f64(self.j2) * mu * r_planet.clone() * r_planet
            / (r2.clone() * r2.clone() * r_norm.clone());

        Vec3::new(
            fac.clone() * r.x.clone() * (S::one() - S::from_f64(5.0) * z2_over_r2.clone()),
            fac.clone() * r.y.clone() * (S::one() - S::from_f64(5.0) * z2_over_r2.clone()),
            fac * r.z.clone() * (S::from_f64(3.0) - S::from_f64(5.0) * z2_over_r2),
        )
    }

    fn potential(&self, _t: &S, r: &Vec3<S>, ctx: &EvalContext) -> S {
        let (mu, r_planet) = self.scaled(ctx);
        let r_norm = norm3(r);
        let cos_phi = r.z.clone() / r_norm.clone();
        let r3 = r_norm.clone() * r_norm.clone() * r_norm;

        S::from_f64(0.5) * S::from_f64(self.j2) * mu * r_planet.clone() * r_planet
            * (S::from_f64(3.0) * cos_phi.clone() * cos_phi - S::one())
            / r3
    }
}

impl J2Perturbation {
    /// Rescales `mu`/`r_planet` to non-dimensional units when the context requests it, mirroring
    /// the source's habit of carrying physical-length-scale constants that must track whichever
    /// units the rest of the propagation is running in.
    fn scaled<S: Scalar>(&self, ctx: &EvalContext) -> (S, S) {
        if ctx.nondimensional {
            (
                S::from_f64(self.mu / ctx.factors.grav),
                S::from_f64(self.r_planet / ctx.factors.length),
            )
        } else {
            (S::from_f64(self.mu), S::from_f64(self.r_planet))
        }
    }
}
