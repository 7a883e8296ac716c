//! Atmospheric drag perturbation, a concrete [`super::Perturbation`] example.
//!
//! Grounded on `original_source/src/perturbations/atmosphere/drag.cpp`.

use std::sync::Arc;

use crate::scalar::Scalar;
use crate::vector::{cross3, norm3, Vec3};

use super::density::AtmosphereDensityModel;
use super::{EvalContext, Perturbation};

/// `A = -(1/2) Cd (area/mass) rho(|R| - r_planet) |V_rel| V_rel`, `V_rel = V - omega_planet x R`.
/// Zero potential (§4.7): drag is purely dissipative.
pub struct DragPerturbation {
    pub drag_coefficient: f64,
    pub area_over_mass: f64,
    pub r_planet: f64,
    pub rotation_rate: f64,
    pub density_model: Arc<dyn AtmosphereDensityModel + Send + Sync>,
}

impl DragPerturbation {
    pub fn new(
        drag_coefficient: f64,
        area_over_mass: f64,
        r_planet: f64,
        rotation_rate: f64,
        density_model: Arc<dyn AtmosphereDensityModel + Send + Sync>,
    ) -> Self {
        Self {
            drag_coefficient,
            area_over_mass,
            r_planet,
            rotation_rate,
            density_model,
        }
    }
}

impl<S: Scalar> Perturbation<S> for DragPerturbation {
    fn total_acceleration(&self, t: &S, r: &Vec3<S>, v: &Vec3<S>, ctx: &EvalContext) -> Vec3<S> {
        self.nonpotential_acceleration(t, r, v, ctx)
    }

    fn nonpotential_acceleration(&self, _t: &S, r: &Vec3<S>, v: &Vec3<S>, ctx: &EvalContext) -> Vec3<S> {
        // km per current length unit: 1.0 in dimensional mode (the unit already is km).
        let length_factor = if ctx.nondimensional { ctx.factors.length } else { 1.0 };
        let rotation_rate = if ctx.nondimensional {
            self.rotation_rate * ctx.factors.time
        } else {
            self.rotation_rate
        };

        let omega = Vec3::new(S::zero(), S::zero(), S::from_f64(rotation_rate));
        let v_rel = v.sub(&cross3(&omega, r));
        let v_rel_norm = norm3(&v_rel);

        let r_planet_scaled = self.r_planet / length_factor;
        let altitude_km = (norm3(r).representative() - r_planet_scaled) * length_factor;
        let rho_si = self.density_model.density(altitude_km);

        // fac = Cd * (A/m) * rho, expressed in 1/(current length unit) by converting the SI
        // area-over-mass and density through the current unit's length-in-metres.
        let length_unit_in_m = length_factor * 1000.0;
        let fac_per_length_unit = self.drag_coefficient * self.area_over_mass * rho_si * length_unit_in_m;

        let fac = S::from_f64(-0.5 * fac_per_length_unit) * v_rel_norm;
        Vec3::new(fac.clone() * v_rel.x, fac.clone() * v_rel.y, fac * v_rel.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensional::DimensionalFactors;
    use crate::perturbations::density::ValladoExponentialDensity;

    #[test]
    fn drag_opposes_relative_velocity() {
        let drag = DragPerturbation::new(
            2.2,
            0.01,
            crate::constants::earth::RADIUS,
            crate::constants::earth::ROTATION_RATE,
            Arc::new(ValladoExponentialDensity),
        );
        let factors = DimensionalFactors {
            length: 1.0,
            velocity: 1.0,
            time: 1.0,
            grav: 1.0,
        };
        let ctx = EvalContext {
            factors: &factors,
            nondimensional: false,
        };
        let r = Vec3::new(crate::constants::earth::RADIUS + 300.0, 0.0_f64, 0.0);
        let v = Vec3::new(0.0_f64, 7.7, 0.0);
        let a = drag.total_acceleration(&0.0, &r, &v, &ctx);
        assert!(a.y < 0.0, "drag should decelerate prograde motion");
    }
}
