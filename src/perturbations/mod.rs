//! Perturbation contract and combiner (C7).
//!
//! Grounded on `original_source/src/perturbations/baseperturbation.cpp` and
//! `perturbationcombiner.cpp`. The dimensional flag the source stores as mutable state on each
//! perturbation is instead threaded through as an [`EvalContext`] argument — see Open Question 5
//! in `DESIGN.md`.

pub mod density;
pub mod drag;
pub mod j2;

pub use density::{AtmosphereDensityModel, ValladoExponentialDensity};
pub use drag::DragPerturbation;
pub use j2::J2Perturbation;

use std::sync::Arc;

use crate::dimensional::DimensionalFactors;
use crate::scalar::Scalar;
use crate::vector::Vec3;

/// Carries the two pieces of context every [`Perturbation`] call needs but no provider owns:
/// the dimensional factors of the current propagation, and whether the call is being made in
/// non-dimensional units.
#[derive(Clone, Copy, Debug)]
pub struct EvalContext<'a> {
    pub factors: &'a DimensionalFactors,
    pub nondimensional: bool,
}

/// A perturbing force/potential acting on a spacecraft. Every method defaults to zero so a
/// provider need only override what it models (§3).
pub trait Perturbation<S: Scalar> {
    fn total_acceleration(&self, _t: &S, _r: &Vec3<S>, _v: &Vec3<S>, _ctx: &EvalContext) -> Vec3<S> {
        Vec3::new(S::zero(), S::zero(), S::zero())
    }

    fn nonpotential_acceleration(&self, _t: &S, _r: &Vec3<S>, _v: &Vec3<S>, _ctx: &EvalContext) -> Vec3<S> {
        Vec3::new(S::zero(), S::zero(), S::zero())
    }

    fn potential(&self, _t: &S, _r: &Vec3<S>, _ctx: &EvalContext) -> S {
        S::zero()
    }

    fn potential_time_derivative(&self, _t: &S, _r: &Vec3<S>, _v: &Vec3<S>, _ctx: &EvalContext) -> S {
        S::zero()
    }
}

/// An ordered sum of perturbations, evaluated in insertion order (§5). Membership is by shared
/// reference, mirroring the teacher's `Vec<Arc<dyn AccelModel + Sync>>` composition.
#[derive(Clone)]
pub struct Combiner<S: Scalar> {
    providers: Vec<Arc<dyn Perturbation<S> + Send + Sync>>,
}

impl<S: Scalar> Default for Combiner<S> {
    fn default() -> Self {
        Self { providers: Vec::new() }
    }
}

impl<S: Scalar> Combiner<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: Arc<dyn Perturbation<S> + Send + Sync>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn push(&mut self, provider: Arc<dyn Perturbation<S> + Send + Sync>) {
        self.providers.push(provider);
    }
}

impl<S: Scalar> Perturbation<S> for Combiner<S> {
    fn total_acceleration(&self, t: &S, r: &Vec3<S>, v: &Vec3<S>, ctx: &EvalContext) -> Vec3<S> {
        let mut acc = Vec3::new(S::zero(), S::zero(), S::zero());
        for p in &self.providers {
            acc = acc.add(&p.total_acceleration(t, r, v, ctx));
        }
        acc
    }

    fn nonpotential_acceleration(&self, t: &S, r: &Vec3<S>, v: &Vec3<S>, ctx: &EvalContext) -> Vec3<S> {
        let mut acc = Vec3::new(S::zero(), S::zero(), S::zero());
        for p in &self.providers {
            acc = acc.add(&p.nonpotential_acceleration(t, r, v, ctx));
        }
        acc
    }

    fn potential(&self, t: &S, r: &Vec3<S>, ctx: &EvalContext) -> S {
        let mut u = S::zero();
        for p in &self.providers {
            u = u + p.potential(t, r, ctx);
        }
        u
    }

    fn potential_time_derivative(&self, t: &S, r: &Vec3<S>, v: &Vec3<S>, ctx: &EvalContext) -> S {
        let mut ut = S::zero();
        for p in &self.providers {
            ut = ut + p.potential_time_derivative(t, r, v, ctx);
        }
        ut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantPotential(f64);

    impl Perturbation<f64> for ConstantPotential {
        fn potential(&self, _t: &f64, _r: &Vec3<f64>, _ctx: &EvalContext) -> f64 {
            self.0
        }
    }

    #[test]
    fn combiner_sums_in_insertion_order() {
        let combiner = Combiner::new()
            .with(Arc::new(ConstantPotential(1.0)) as Arc<dyn Perturbation<f64> + Send + Sync>)
            .with(Arc::new(ConstantPotential(2.0)) as Arc<dyn Perturbation<f64> + Send + Sync>);
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
        let r = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(combiner.potential(&0.0, &r, &ctx), 3.0);
    }
}
