use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// The capability set every numeric kind propagated by this crate must provide.
///
/// Two concrete implementations exist: the primitive `f64`, and [`crate::polynomial::Polynomial`],
/// a truncated multivariate Taylor series. No other component in this crate is allowed to assume
/// which variant it is working with — every transform, RHS, and propagator is generic over `S:
/// Scalar`.
pub trait Scalar:
    Clone
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Builds a scalar representing an exact real literal (e.g. `2.0`).
    fn from_f64(x: f64) -> Self;

    /// The "representative value" used for convergence tests (C4) and non-dimensionalisation
    /// (C3): the value itself for a real, the constant-term coefficient for a polynomial.
    fn representative(&self) -> f64;

    /// Raises `self` to a real exponent.
    fn powf(&self, exp: f64) -> Self;

    fn sqrt(&self) -> Self;
    fn sin(&self) -> Self;
    fn cos(&self) -> Self;
    fn exp(&self) -> Self;

    /// Four-quadrant arctangent of `self` (as `y`) and `x`.
    fn atan2(&self, x: &Self) -> Self;

    /// Names this scalar kind for [`crate::error::CoreError::UnsupportedStateShape`] diagnostics
    /// (§4.11) — the only place the core needs to tell "which variant it is working with" despite
    /// §4.1's rule that no other component may assume one.
    fn kind_name() -> &'static str;

    /// Zero of this scalar kind.
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    /// One of this scalar kind.
    fn one() -> Self {
        Self::from_f64(1.0)
    }
}

impl Scalar for f64 {
    fn from_f64(x: f64) -> Self {
        x
    }

    fn representative(&self) -> f64 {
        *self
    }

    fn powf(&self, exp: f64) -> Self {
        f64::powf(*self, exp)
    }

    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }

    fn sin(&self) -> Self {
        f64::sin(*self)
    }

    fn cos(&self) -> Self {
        f64::cos(*self)
    }

    fn exp(&self) -> Self {
        f64::exp(*self)
    }

    fn atan2(&self, x: &Self) -> Self {
        f64::atan2(*self, *x)
    }

    fn kind_name() -> &'static str {
        "f64"
    }
}
