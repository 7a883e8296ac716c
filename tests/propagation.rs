//! End-to-end propagation properties (§8 scenarios 1, 2, 4, 5, and the energy/agreement
//! invariants).

use std::sync::Arc;

use approx::assert_relative_eq;
use geqoe_core::{
    propagate_cowell, propagate_geqoe, Combiner, DragPerturbation, J2Perturbation, PropagatorOptions, StateShape,
    ValladoExponentialDensity,
};

const MU: f64 = 398600.4418;
const R_EARTH: f64 = 6378.13646;

fn init_log() {
    if pretty_env_logger::try_init().is_err() {
        // already initialised by another test in this binary
    }
}

fn specific_energy(state: &[f64; 6]) -> f64 {
    let r = (state[0] * state[0] + state[1] * state[1] + state[2] * state[2]).sqrt();
    let v2 = state[3] * state[3] + state[4] * state[4] + state[5] * state[5];
    0.5 * v2 - MU / r
}

/// Scenario 1: a bare Keplerian ellipse returns to (approximately) its initial radius after one
/// full period with no perturbation.
#[test]
fn keplerian_ellipse_returns_to_initial_radius_after_one_period() {
    init_log();
    let state: [f64; 6] = [7000.0, 0.0, 0.0, 0.0, 7.5, 0.0];
    let r0 = (state[0] * state[0] + state[1] * state[1] + state[2] * state[2]).sqrt();
    let period = 86400.0;

    let pert: Combiner<f64> = Combiner::new();
    let opts = PropagatorOptions::default();
    let final_state = propagate_cowell(&0.0, &period, 60.0, &state, &MU, StateShape::Cartesian, opts, &pert).unwrap();
    let r_final = (final_state[0] * final_state[0] + final_state[1] * final_state[1] + final_state[2] * final_state[2]).sqrt();

    assert_relative_eq!(r_final, r0, max_relative = 1e-6);
}

/// Scenario 5: with no perturbation, the Cowell propagator's output over a near-circular orbit
/// should agree with the analytical two-body radius at the same epoch (here, one full period, so
/// the analytical radius is simply the initial one again).
#[test]
fn zero_perturbation_cowell_matches_analytical_kepler_propagation() {
    init_log();
    let state: [f64; 6] = [7000.0, 0.0, 0.0, 0.0, 7.5, 0.0];
    let period = 2.0 * std::f64::consts::PI * (state[0].powi(3) / MU).sqrt();

    let pert: Combiner<f64> = Combiner::new();
    let opts = PropagatorOptions::with_adaptive_step(0.001, 2700.0, 1e-12, 1e-12);
    let final_state = propagate_cowell(&0.0, &period, 60.0, &state, &MU, StateShape::Cartesian, opts, &pert).unwrap();

    for i in 0..6 {
        assert!(
            (final_state[i] - state[i]).abs() <= 1e-3,
            "component {} did not return close to the analytical start-of-period state",
            i
        );
    }
}

/// Zero-perturbation energy conservation, both formulations, over one orbital period.
#[test]
fn zero_perturbation_conserves_energy_both_formulations() {
    init_log();
    let state: [f64; 6] = [7000.0, 1500.0, 300.0, -1.0, 7.0, 1.5];
    let e0 = specific_energy(&state);
    let period = 2.0 * std::f64::consts::PI * (7500.0_f64.powi(3) / MU).sqrt();

    let pert: Combiner<f64> = Combiner::new();
    let opts = PropagatorOptions::default();

    let cowell_final = propagate_cowell(&0.0, &period, 60.0, &state, &MU, StateShape::Cartesian, opts, &pert).unwrap();
    let e_cowell = specific_energy(&cowell_final);
    assert!((e_cowell - e0).abs() / e0.abs() <= 1e-8, "Cowell energy drifted");

    let geqoe_final = propagate_geqoe(&0.0, &period, 60.0, &state, &MU, StateShape::Cartesian, opts, &pert).unwrap();
    let e_geqoe = specific_energy(&geqoe_final);
    assert!((e_geqoe - e0).abs() / e0.abs() <= 1e-8, "GEqOE energy drifted");
}

fn j2_combiner() -> Combiner<f64> {
    Combiner::new().with(Arc::new(J2Perturbation::new(MU, R_EARTH, 1.082626111e-3)) as Arc<dyn geqoe_core::Perturbation<f64> + Send + Sync>)
}

/// Scenario 4 (formulation agreement): with a J2-only perturbation, Cowell and GEqOE propagated
/// over one day from a 500 km circular LEO should agree tightly in position and velocity.
#[test]
fn formulation_agreement_with_j2_over_one_day() {
    init_log();
    let r0 = R_EARTH + 500.0;
    let vc = (MU / r0).sqrt();
    let state: [f64; 6] = [r0, 0.0, 0.0, 0.0, vc * 30.0_f64.to_radians().cos(), vc * 30.0_f64.to_radians().sin()];
    let one_day = 86400.0;

    let pert = j2_combiner();
    let opts = PropagatorOptions::default();

    let cowell_final = propagate_cowell(&0.0, &one_day, 60.0, &state, &MU, StateShape::Cartesian, opts, &pert).unwrap();
    let geqoe_final = propagate_geqoe(&0.0, &one_day, 60.0, &state, &MU, StateShape::Cartesian, opts, &pert).unwrap();

    let pos_diff = ((cowell_final[0] - geqoe_final[0]).powi(2)
        + (cowell_final[1] - geqoe_final[1]).powi(2)
        + (cowell_final[2] - geqoe_final[2]).powi(2))
    .sqrt();
    let vel_diff = ((cowell_final[3] - geqoe_final[3]).powi(2)
        + (cowell_final[4] - geqoe_final[4]).powi(2)
        + (cowell_final[5] - geqoe_final[5]).powi(2))
    .sqrt();

    assert!(pos_diff <= 0.01, "position disagreement {} km exceeds 10 m", pos_diff);
    assert!(vel_diff <= 1e-5, "velocity disagreement {} km/s exceeds 10 mm/s", vel_diff);
}

/// Non-dimensionalisation invariance: running the same propagation with and without non-dim
/// scaling should agree closely.
#[test]
fn non_dimensionalisation_does_not_change_the_result() {
    init_log();
    let r0 = R_EARTH + 500.0;
    let vc = (MU / r0).sqrt();
    let state: [f64; 6] = [r0, 0.0, 0.0, 0.0, vc, 0.0];
    let duration = 3600.0;

    let pert = j2_combiner();
    let mut dim_opts = PropagatorOptions::default();
    dim_opts.non_dimensional = false;
    let mut nondim_opts = PropagatorOptions::default();
    nondim_opts.non_dimensional = true;

    let dim_final = propagate_cowell(&0.0, &duration, 60.0, &state, &MU, StateShape::Cartesian, dim_opts, &pert).unwrap();
    let nondim_final = propagate_cowell(&0.0, &duration, 60.0, &state, &MU, StateShape::Cartesian, nondim_opts, &pert).unwrap();

    for i in 0..6 {
        let scale = dim_final[i].abs().max(1e-9);
        assert!(
            (dim_final[i] - nondim_final[i]).abs() / scale <= 1e-8,
            "component {} disagrees between dimensional and non-dimensional runs",
            i
        );
    }
}

/// Scenario 2: the reference point-propagation run must simply complete successfully (fixed step,
/// a full year, the reference-run J2 coefficient). Left un-ignored since this crate never invokes
/// the toolchain to discover how long it actually takes.
#[test]
fn reference_point_propagation_run_completes() {
    init_log();
    let state: [f64; 6] = [6916.0, 0.0, 0.0, 0.0, 4.483946567026534, 8.954234385325996];
    let mu = 398600.4414498200;
    let duration = 86400.0 * 365.25;

    let drag = DragPerturbation::new(2.2, 0.01, R_EARTH, 7.292115855306587e-5, Arc::new(ValladoExponentialDensity));
    let j2 = J2Perturbation::new(mu, R_EARTH, 1.082626111e-3);
    let pert = Combiner::new()
        .with(Arc::new(j2) as Arc<dyn geqoe_core::Perturbation<f64> + Send + Sync>)
        .with(Arc::new(drag) as Arc<dyn geqoe_core::Perturbation<f64> + Send + Sync>);

    let opts = PropagatorOptions::with_fixed_step(60.0);
    let result = propagate_geqoe(&0.0, &duration, 60.0, &state, &mu, StateShape::Cartesian, opts, &pert);
    assert!(result.is_ok(), "reference run should complete without a domain error");
}
