//! Element-set transforms: Cartesian<->Keplerian (C5) and Cartesian<->GEqOE (C6).

pub mod geqoe;
pub mod keplerian;

pub use geqoe::{cartesian_to_geqoe, geqoe_to_cartesian};
pub use keplerian::{cartesian_to_keplerian, keplerian_to_cartesian};

use crate::scalar::Scalar;

/// `acos` is not part of the `Scalar` capability set (§4.1 lists only `pow`, `sqrt`, `sin`, `cos`,
/// `exp`, `atan2`); it is derived here as `atan2(sqrt(1 - x^2), x)`, which stays within [0, pi]
/// exactly like the primitive it is standing in for, and works for the polynomial scalar with no
/// extra machinery.
pub(crate) fn acos_s<S: Scalar>(x: &S) -> S {
    let one = S::one();
    (one - x.clone() * x.clone()).sqrt().atan2(x)
}

/// Likewise, `atan(y) = atan2(y, 1)`.
pub(crate) fn atan_s<S: Scalar>(y: &S) -> S {
    y.atan2(&S::one())
}

/// Flips `angle` to `2*pi - angle` when `flip` is true (the `2*M_PI - angle` idiom used throughout
/// the source's singularity-branch handling).
pub(crate) fn flip_if<S: Scalar>(angle: S, flip: bool) -> S {
    if flip {
        S::from_f64(2.0 * std::f64::consts::PI) - angle
    } else {
        angle
    }
}
