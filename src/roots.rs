//! Newton-Raphson root finder (C4), generic over any [`Scalar`].
//!
//! Grounded on `original_source/src/util/root.cpp`'s `newton_raphson`, which iterates with no
//! bound on the step count. This crate imposes the cap the source lacks and fails with
//! [`CoreError::RootFailedToConverge`] instead of looping forever on a pathological input.

use crate::error::CoreError;
use crate::scalar::Scalar;

/// Default convergence tolerance on the representative value (§4.4).
pub const DEFAULT_TOL: f64 = 1e-10;

/// Default iteration cap — not specified by the source, added per the design note in §9.
pub const DEFAULT_MAX_ITER: usize = 50;

/// Solves `f(x) = 0` given `f` and its derivative `df`, starting from `x0`, via
/// `x <- x - f(x)/f'(x)`, converging when `|representative(x_{n+1} - x_n)| < tol`.
pub fn newton_raphson<S, F, DF>(f: F, df: DF, x0: S, tol: f64, max_iter: usize) -> Result<S, CoreError>
where
    S: Scalar,
    F: Fn(&S) -> S,
    DF: Fn(&S) -> S,
{
    let mut x = x0;
    for iteration in 1..=max_iter {
        let fx = f(&x);
        let dfx = df(&x);
        let x1 = x.clone() - fx / dfx;
        let delta = (x1.representative() - x.representative()).abs();
        if delta < tol {
            return Ok(x1);
        }
        x = x1;
    }
    Err(CoreError::RootFailedToConverge {
        iterations: max_iter,
        last_value: x.representative(),
    })
}

/// Convenience wrapper using the default tolerance and iteration cap.
pub fn newton_raphson_default<S, F, DF>(f: F, df: DF, x0: S) -> Result<S, CoreError>
where
    S: Scalar,
    F: Fn(&S) -> S,
    DF: Fn(&S) -> S,
{
    newton_raphson(f, df, x0, DEFAULT_TOL, DEFAULT_MAX_ITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_kepler_like_equation() {
        // K + 0.1 cos K - 0.05 sin K - 1.0 = 0
        let p1 = 0.1_f64;
        let p2 = 0.05_f64;
        let l = 1.0_f64;
        let f = |k: &f64| k + p1 * k.cos() - p2 * k.sin() - l;
        let df = |k: &f64| 1.0 - p1 * k.sin() - p2 * k.cos();
        let k = newton_raphson_default(f, df, l).unwrap();
        assert!((k + p1 * k.cos() - p2 * k.sin() - l).abs() <= 1e-10);
    }

    #[test]
    fn fails_to_converge_on_pathological_input() {
        // f has a zero derivative at the starting point, f never decreases its residual.
        let f = |x: &f64| x.powi(2) + 1.0;
        let df = |_x: &f64| 0.0_f64;
        let result = newton_raphson(f, df, 0.0_f64, 1e-10, 5);
        assert!(matches!(result, Err(CoreError::RootFailedToConverge { iterations: 5, .. })));
    }
}
