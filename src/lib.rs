//! Orbital propagation engine core: Cowell (Cartesian) and GEqOE formulations, generic over a
//! real or polynomial [`Scalar`].
//!
//! This crate is the numerical core only (§1/§6): no file formats, no wire protocols, no CLI. It
//! exposes the element-set transforms (C5/C6), the dimensional-factor machinery (C3), the
//! perturbation contract and two concrete providers (C7), the two right-hand sides (C8/C9), and
//! the propagator driver (C10) that ties them together.

pub mod constants;
pub mod dimensional;
pub mod dynamics;
pub mod error;
pub mod perturbations;
pub mod polynomial;
pub mod propagators;
pub mod roots;
pub mod scalar;
pub mod state;
pub mod transforms;
pub mod vector;

pub use dimensional::{
    compute_factors, dimensionalise_cartesian, dimensionalise_mu, dimensionalise_time, nondimensionalise_cartesian,
    nondimensionalise_mu, nondimensionalise_time, DimensionalFactors,
};
pub use dynamics::{cowell_rhs, geqoe_rhs};
pub use error::CoreError;
pub use perturbations::{AtmosphereDensityModel, Combiner, DragPerturbation, EvalContext, J2Perturbation, Perturbation, ValladoExponentialDensity};
pub use polynomial::Polynomial;
pub use propagators::{propagate_cowell, propagate_cowell_batch, propagate_geqoe, propagate_geqoe_batch, IntegrationDetails, PropagatorOptions, RK, RK4, RKCK45};
pub use roots::{newton_raphson, newton_raphson_default};
pub use scalar::Scalar;
pub use state::{cartesian_rv, cartesian_state, State6, StateShape};
pub use transforms::{cartesian_to_geqoe, cartesian_to_keplerian, geqoe_to_cartesian, keplerian_to_cartesian};
pub use vector::{cross3, dot3, norm3, Vec3};
