//! Cartesian<->Keplerian transform (C5).
//!
//! Grounded on `original_source/src/conversions/keplerian.cpp`: `cartesian_to_keplerian` and
//! `keplerian_to_cartesian`.

use super::acos_s;
use crate::error::CoreError;
use crate::scalar::Scalar;
use crate::state::{cartesian_rv, State6};
use crate::vector::{cross3, dot3, norm3, Vec3};

const SINGULARITY_TOL: f64 = 1e-12;

/// Classical six-element extraction with singularity handling (§4.5).
///
/// Fails with [`CoreError::InvalidOrbit`] when `a = 0`, `r = 0`, or `h = 0`.
pub fn cartesian_to_keplerian<S: Scalar>(state: &State6<S>, mu: &S) -> Result<State6<S>, CoreError> {
    let (r_vec, v_vec) = cartesian_rv(state);
    let k_hat: Vec3<S> = Vec3::new(S::zero(), S::zero(), S::one());

    let r = norm3(&r_vec);
    let v = norm3(&v_vec);

    if r.representative() == 0.0 {
        return Err(CoreError::InvalidOrbit {
            reason: "r = 0".to_string(),
        });
    }

    let sma = S::one() / (S::from_f64(2.0) / r.clone() - v.clone() * v.clone() / mu.clone());
    if sma.representative() == 0.0 {
        return Err(CoreError::InvalidOrbit {
            reason: "a = 0".to_string(),
        });
    }

    let h_vec = cross3(&r_vec, &v_vec);
    let h = norm3(&h_vec);
    if h.representative() == 0.0 {
        return Err(CoreError::InvalidOrbit {
            reason: "h = 0".to_string(),
        });
    }

    let e_vec = cross3(&v_vec, &h_vec)
        .div_scalar(mu)
        .sub(&r_vec.div_scalar(&r));
    let e = norm3(&e_vec);

    let inc = acos_s(&(h_vec.z.clone() / h.clone()));

    let e_near = e.representative().abs() < SINGULARITY_TOL;
    let inc_near = inc.representative().abs() < SINGULARITY_TOL;

    let n_vec = cross3(&k_hat, &h_vec);
    let n = norm3(&n_vec);

    let raan = if inc_near {
        S::zero()
    } else {
        let angle = acos_s(&(n_vec.x.clone() / n.clone()));
        super::flip_if(angle, n_vec.y.representative() < 0.0)
    };

    let aop = if inc_near && e_near {
        S::zero()
    } else if inc_near {
        let angle = e_vec.y.clone().atan2(&e_vec.x);
        super::flip_if(angle, h_vec.z.representative() < 0.0)
    } else {
        let angle = acos_s(&(dot3(&n_vec, &e_vec) / (n.clone() * e.clone())));
        super::flip_if(angle, e_vec.z.representative() < 0.0)
    };

    let ta = if inc_near && e_near {
        let angle = acos_s(&(r_vec.x.clone() / r.clone()));
        super::flip_if(angle, v_vec.x.representative() > 0.0)
    } else if e_near {
        let angle = acos_s(&(dot3(&n_vec, &r_vec) / (n.clone() * r.clone())));
        super::flip_if(angle, r_vec.z.representative() < 0.0)
    } else {
        let angle = acos_s(&(dot3(&e_vec, &r_vec) / (e.clone() * r.clone())));
        super::flip_if(angle, dot3(&r_vec, &v_vec).representative() < 0.0)
    };

    Ok([sma, e, inc, raan, aop, ta])
}

/// Reverse transform: three planar rotations applied to the perifocal position/velocity.
pub fn keplerian_to_cartesian<S: Scalar>(keplerian: &State6<S>, mu: &S) -> State6<S> {
    let [sma, e, inc, raan, aop, ta] = keplerian.clone();

    let cinc = inc.cos();
    let sinc = inc.sin();
    let craan = raan.cos();
    let sraan = raan.sin();
    let caop = aop.cos();
    let saop = aop.sin();
    let cta = ta.clone().cos();
    let sta = ta.clone().sin();

    let half_ta = ta / S::from_f64(2.0);
    let tan_half_ta = half_ta.clone().sin() / half_ta.cos();
    let ecc_ratio = ((S::one() - e.clone()) / (S::one() + e.clone())).sqrt();
    let ecc_anomaly = super::atan_s(&(ecc_ratio * tan_half_ta)) * S::from_f64(2.0);

    let r = sma.clone() * (S::one() - e.clone() * e.clone()) / (S::one() + e.clone() * cta.clone());

    let o = [r.clone() * cta, r.clone() * sta, S::zero()];

    let fac = (mu.clone() * sma.clone()).sqrt() / r.clone();
    let dodt = [
        -(fac.clone() * ecc_anomaly.clone().sin()),
        fac * (S::one() - e.clone() * e).sqrt() * ecc_anomaly.cos(),
        S::zero(),
    ];

    let ang00 = caop.clone() * craan.clone() - saop.clone() * cinc.clone() * sraan.clone();
    let ang01 = -(saop.clone() * craan.clone()) - caop.clone() * cinc.clone() * sraan.clone();
    let ang10 = caop.clone() * sraan.clone() + saop.clone() * cinc.clone() * craan.clone();
    let ang11 = caop.clone() * cinc.clone() * craan - saop.clone() * sraan;
    let ang20 = saop * sinc.clone();
    let ang21 = caop * sinc;

    let ang = [[ang00, ang01], [ang10, ang11], [ang20, ang21]];

    let mut rv = [S::zero(), S::zero(), S::zero(), S::zero(), S::zero(), S::zero()];
    for i in 0..3 {
        rv[i] = o[0].clone() * ang[i][0].clone() + o[1].clone() * ang[i][1].clone();
        rv[i + 3] = dodt[0].clone() * ang[i][0].clone() + dodt[1].clone() * ang[i][1].clone();
    }
    rv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_general_orbit() {
        let mu = 398600.4418_f64;
        let state: State6<f64> = [7000.0, 1500.0, 300.0, -1.0, 7.0, 1.5];
        let kep = cartesian_to_keplerian(&state, &mu).unwrap();
        let back = keplerian_to_cartesian(&kep, &mu);
        for i in 0..6 {
            assert!((back[i] - state[i]).abs() <= state[i].abs() * 1e-9 + 1e-9);
        }
    }

    #[test]
    fn equatorial_circular_singularity() {
        let mu = 398600.4418_f64;
        let vc = (mu / 7000.0_f64).sqrt();
        let state: State6<f64> = [7000.0, 0.0, 0.0, 0.0, vc, 0.0];
        let kep = cartesian_to_keplerian(&state, &mu).unwrap();
        assert!(kep[1].abs() < 1e-12, "eccentricity should be ~0");
        assert!(kep[2].abs() < 1e-12, "inclination should be ~0");
        assert!(kep[3].abs() < 1e-12, "raan should be 0 on this branch");
        assert!(kep[4].abs() < 1e-12, "aop should be 0 on this branch");

        let back = keplerian_to_cartesian(&kep, &mu);
        for i in 0..6 {
            assert!((back[i] - state[i]).abs() <= 1e-9);
        }
    }
}
