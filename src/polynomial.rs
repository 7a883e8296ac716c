//! A truncated multivariate Taylor-series scalar.
//!
//! This is the "polynomial that implements S" referred to in the Scalar abstraction (C1): a
//! concrete stand-in for uncertainty-carrying states, graded by total degree and truncated at a
//! caller-chosen maximum degree. It is not a general computer-algebra system — multiplication,
//! division, and the transcendental operations are all implemented by composing the univariate
//! Taylor expansion of the relevant elementary function at the polynomial's constant term with its
//! non-constant part (which is nilpotent under truncation, since every non-constant monomial has
//! total degree >= 1 and powers beyond `degree` vanish). This is the standard differential-algebra
//! technique used by truncated-Taylor-series propagation libraries.

use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::scalar::Scalar;

/// Exponent vector, one entry per variable, total degree `sum(exponents) <= degree`.
type Exponents = Vec<u16>;

/// A multivariate polynomial over `f64`, truncated at `degree`, in `nvars` variables.
#[derive(Clone, Debug)]
pub struct Polynomial {
    nvars: usize,
    degree: usize,
    terms: HashMap<Exponents, f64>,
}

const ZERO_TOL: f64 = 0.0;

impl Polynomial {
    /// A polynomial equal to the real constant `value`.
    pub fn constant(nvars: usize, degree: usize, value: f64) -> Self {
        let mut terms = HashMap::new();
        if value != ZERO_TOL {
            terms.insert(vec![0u16; nvars], value);
        }
        Polynomial { nvars, degree, terms }
    }

    /// The polynomial representing the bare independent variable `index` (0-based).
    pub fn variable(nvars: usize, degree: usize, index: usize) -> Self {
        assert!(index < nvars, "variable index out of range");
        let mut exps = vec![0u16; nvars];
        exps[index] = 1;
        let mut terms = HashMap::new();
        terms.insert(exps, 1.0);
        Polynomial { nvars, degree, terms }
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The constant-term (degree-0) coefficient. This is the "representative value" used for
    /// Newton-iteration convergence tests (C4) and for deriving the (real) dimensional factors
    /// (C3) from a polynomial state.
    pub fn constant_coefficient(&self) -> f64 {
        self.terms
            .get(&vec![0u16; self.nvars])
            .copied()
            .unwrap_or(0.0)
    }

    /// Evaluates the polynomial at a concrete point in variable space.
    pub fn evaluate(&self, point: &[f64]) -> f64 {
        assert_eq!(point.len(), self.nvars);
        let mut total = 0.0;
        for (exps, coeff) in &self.terms {
            let mut term = *coeff;
            for (e, x) in exps.iter().zip(point) {
                if *e > 0 {
                    term *= x.powi(*e as i32);
                }
            }
            total += term;
        }
        total
    }

    fn total_degree(exps: &[u16]) -> usize {
        exps.iter().map(|&e| e as usize).sum()
    }

    fn without_constant(&self) -> Polynomial {
        let mut terms = self.terms.clone();
        terms.remove(&vec![0u16; self.nvars]);
        Polynomial {
            nvars: self.nvars,
            degree: self.degree,
            terms,
        }
    }

    fn is_zero(&self) -> bool {
        self.terms.values().all(|c| *c == 0.0)
    }

    fn scaled(&self, factor: f64) -> Polynomial {
        if factor == 0.0 {
            return Polynomial::constant(self.nvars, self.degree, 0.0);
        }
        let terms = self
            .terms
            .iter()
            .map(|(k, v)| (k.clone(), v * factor))
            .collect();
        Polynomial {
            nvars: self.nvars,
            degree: self.degree,
            terms,
        }
    }

    /// Resolves the common (nvars, degree) two operands should be combined under. A polynomial
    /// built by `from_f64` carries `nvars = 0` (a "bare scalar"); it broadcasts to whatever shape
    /// it is combined with, which is what lets generic code write `S::from_f64(2.0) * state_term`
    /// without threading the ambient variable count/degree through every literal.
    fn shape_with(&self, other: &Polynomial) -> (usize, usize) {
        if self.nvars == 0 {
            (other.nvars, other.degree)
        } else if other.nvars == 0 {
            (self.nvars, self.degree)
        } else {
            debug_assert_eq!(self.nvars, other.nvars, "polynomials of incompatible shape combined");
            (self.nvars, self.degree.max(other.degree))
        }
    }

    /// Reinterprets `self` under the given (nvars, degree), broadcasting a bare scalar and
    /// dropping any terms that would exceed the target degree.
    fn broadcast(&self, nvars: usize, degree: usize) -> Polynomial {
        if self.nvars == nvars && self.degree == degree {
            return self.clone();
        }
        if self.nvars == 0 {
            return Polynomial::constant(nvars, degree, self.constant_coefficient());
        }
        let terms = self
            .terms
            .iter()
            .filter(|(e, _)| Self::total_degree(e) <= degree)
            .map(|(e, v)| (e.clone(), *v))
            .collect();
        Polynomial { nvars, degree, terms }
    }

    fn added(&self, other: &Polynomial) -> Polynomial {
        let (nvars, degree) = self.shape_with(other);
        let a = self.broadcast(nvars, degree);
        let b = other.broadcast(nvars, degree);
        let mut terms = a.terms.clone();
        for (k, v) in &b.terms {
            let entry = terms.entry(k.clone()).or_insert(0.0);
            *entry += v;
        }
        terms.retain(|_, v| *v != 0.0);
        Polynomial { nvars, degree, terms }
    }

    /// Truncated convolution product: terms whose combined total degree exceeds `degree` are
    /// dropped, which is exactly the nilpotency that makes the elementary-function compositions
    /// below well-defined and finite.
    fn multiplied(&self, other: &Polynomial) -> Polynomial {
        let (nvars, degree) = self.shape_with(other);
        let a = self.broadcast(nvars, degree);
        let b = other.broadcast(nvars, degree);
        let mut terms: HashMap<Exponents, f64> = HashMap::new();
        for (ea, ca) in &a.terms {
            for (eb, cb) in &b.terms {
                let mut combined = vec![0u16; nvars];
                for i in 0..nvars {
                    combined[i] = ea[i] + eb[i];
                }
                if Self::total_degree(&combined) > degree {
                    continue;
                }
                let entry = terms.entry(combined).or_insert(0.0);
                *entry += ca * cb;
            }
        }
        terms.retain(|_, v| *v != 0.0);
        Polynomial { nvars, degree, terms }
    }

    /// Composes an elementary function `f` at `self = c0 + g` (where `g` is the non-constant,
    /// hence nilpotent-under-truncation, part of `self`) given the Taylor coefficients of `f`
    /// around `c0`: `coeff_k(c0) = f^(k)(c0) / k!`.
    fn compose(&self, coeff_k: impl Fn(usize, f64) -> f64) -> Polynomial {
        let c0 = self.constant_coefficient();
        let g = self.without_constant();
        let mut result = Polynomial::constant(self.nvars, self.degree, coeff_k(0, c0));
        if g.is_zero() {
            return result;
        }
        let mut gk = Polynomial::constant(self.nvars, self.degree, 1.0);
        for k in 1..=self.degree {
            gk = gk.multiplied(&g);
            if gk.is_zero() {
                break;
            }
            result = result.added(&gk.scaled(coeff_k(k, c0)));
        }
        result
    }

    /// Binomial-series coefficient `C(exp, k) = exp(exp-1)...(exp-k+1) / k!` used for `pow`,
    /// `sqrt`, and reciprocal (exp = -1).
    fn binom_coeff(exp: f64, k: usize, c0: f64) -> f64 {
        if k == 0 {
            return c0.powf(exp);
        }
        let mut numerator = 1.0;
        for i in 0..k {
            numerator *= exp - i as f64;
        }
        let mut fact = 1.0;
        for i in 1..=k {
            fact *= i as f64;
        }
        (numerator / fact) * c0.powf(exp - k as f64)
    }

    /// Multiplicative inverse, valid only where the constant coefficient is nonzero (same
    /// precondition as the source, which performs no domain check either).
    fn reciprocal(&self) -> Polynomial {
        self.compose(|k, c0| Self::binom_coeff(-1.0, k, c0))
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        self.added(&rhs)
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        self.added(&rhs.scaled(-1.0))
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        self.multiplied(&rhs)
    }
}

impl Div for Polynomial {
    type Output = Polynomial;
    fn div(self, rhs: Polynomial) -> Polynomial {
        self.multiplied(&rhs.reciprocal())
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        self.scaled(-1.0)
    }
}

impl Scalar for Polynomial {
    fn from_f64(x: f64) -> Self {
        // A bare real literal knows neither the ambient variable count nor the truncation
        // degree; it is built as a 0-variable "scalar" polynomial and broadcasts to whichever
        // shape it is combined with (see `shape_with`/`broadcast`).
        Polynomial::constant(0, 0, x)
    }

    fn representative(&self) -> f64 {
        self.constant_coefficient()
    }

    fn powf(&self, exp: f64) -> Self {
        self.compose(|k, c0| Self::binom_coeff(exp, k, c0))
    }

    fn sqrt(&self) -> Self {
        self.powf(0.5)
    }

    fn sin(&self) -> Self {
        self.compose(|k, c0| {
            let (value, factorial) = Self::trig_term(k, c0, true);
            value / factorial
        })
    }

    fn cos(&self) -> Self {
        self.compose(|k, c0| {
            let (value, factorial) = Self::trig_term(k, c0, false);
            value / factorial
        })
    }

    fn exp(&self) -> Self {
        self.compose(|k, c0| {
            let mut fact = 1.0;
            for i in 1..=k {
                fact *= i as f64;
            }
            c0.exp() / fact
        })
    }

    fn atan2(&self, x: &Self) -> Self {
        let y0 = self.constant_coefficient();
        let x0 = x.constant_coefficient();
        let theta0 = y0.atan2(x0);
        let (s0, c0) = (theta0.sin(), theta0.cos());

        let numerator = self.scaled(c0).added(&x.scaled(-s0));
        let denominator = x.scaled(c0).added(&self.scaled(s0));
        let u = numerator.multiplied(&denominator.reciprocal());

        let series = u.compose(|k, _u0| {
            if k % 2 == 0 {
                0.0
            } else {
                let j = (k - 1) / 2;
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                sign / (2.0 * j as f64 + 1.0)
            }
        });
        Polynomial::constant(self.nvars, self.degree, theta0).added(&series)
    }

    fn kind_name() -> &'static str {
        "polynomial"
    }
}

impl Polynomial {
    /// Shared sin/cos Taylor-coefficient helper: returns `(derivative_value, k!)`.
    fn trig_term(k: usize, c0: f64, is_sin: bool) -> (f64, f64) {
        let mut fact = 1.0;
        for i in 1..=k {
            fact *= i as f64;
        }
        let value = match (k % 4, is_sin) {
            (0, true) => c0.sin(),
            (1, true) => c0.cos(),
            (2, true) => -c0.sin(),
            (3, true) => -c0.cos(),
            (0, false) => c0.cos(),
            (1, false) => -c0.sin(),
            (2, false) => -c0.cos(),
            (_, false) => c0.sin(),
        };
        (value, fact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{norm3, Vec3};

    /// The bare independent variable in a single-variable space, at the given truncation degree.
    fn x(degree: usize) -> Polynomial {
        Polynomial::variable(1, degree, 0)
    }

    #[test]
    fn constant_evaluates_everywhere_to_its_value() {
        let c = Polynomial::constant(2, 3, 5.0);
        assert_eq!(c.evaluate(&[1.0, 2.0]), 5.0);
        assert_eq!(c.representative(), 5.0);
        assert_eq!(c.nvars(), 2);
        assert_eq!(c.degree(), 3);
    }

    #[test]
    fn variable_evaluates_to_the_matching_component() {
        let v = Polynomial::variable(2, 2, 1);
        assert_eq!(v.evaluate(&[10.0, 3.0]), 3.0);
    }

    #[test]
    fn addition_matches_pointwise_evaluation() {
        let a = Polynomial::constant(1, 2, 2.0) + x(2);
        let b = Polynomial::constant(1, 2, 1.0);
        let sum = a + b;
        assert_eq!(sum.evaluate(&[0.5]), 2.0 + 0.5 + 1.0);
    }

    #[test]
    fn multiplication_truncates_terms_beyond_the_configured_degree() {
        let squared_degree1 = x(1) * x(1);
        assert!(squared_degree1.is_zero(), "x^2 should vanish once truncated at degree 1");

        let squared_degree2 = x(2) * x(2);
        assert_eq!(squared_degree2.evaluate(&[3.0]), 9.0);
    }

    #[test]
    fn broadcast_promotes_bare_scalars_to_the_operand_shape() {
        let bare = Polynomial::from_f64(2.0);
        let dx = x(2);
        let sum = bare + dx;
        assert_eq!(sum.nvars(), 1);
        assert_eq!(sum.degree(), 2);
        assert_eq!(sum.evaluate(&[0.25]), 2.25);
    }

    #[test]
    fn reciprocal_matches_the_binomial_series_to_truncation_order() {
        let c0 = 2.0;
        let p = Polynomial::constant(1, 2, c0) + x(2);
        let recip = Polynomial::constant(1, 2, 1.0) / p;

        let dx = 0.1;
        let exact = 1.0 / (c0 + dx);
        let got = recip.evaluate(&[dx]);
        // The series is truncated at degree 2, so the error is O(dx^3) = O(1e-3).
        assert!((got - exact).abs() < 1e-3, "got {}, exact {}", got, exact);
    }

    #[test]
    fn sqrt_squared_recovers_the_original_to_truncation_order() {
        let degree = 4;
        let p = Polynomial::constant(1, degree, 9.0) + x(degree);
        let root = p.sqrt();
        let back = root.clone() * root;

        let dx = 0.05;
        let expected = p.evaluate(&[dx]);
        let got = back.evaluate(&[dx]);
        assert!((got - expected).abs() < 1e-6, "got {}, expected {}", got, expected);
    }

    #[test]
    fn sin_squared_plus_cos_squared_is_one() {
        let degree = 4;
        let p = Polynomial::constant(1, degree, 0.3) + x(degree);
        let s = p.sin();
        let c = p.cos();
        let identity = s.clone() * s + c.clone() * c;

        let dx = 0.1;
        assert!((identity.evaluate(&[dx]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exp_derivative_matches_finite_difference() {
        let degree = 3;
        let p = Polynomial::constant(1, degree, 1.0) + x(degree);
        let e = p.exp();

        let dx = 1e-3;
        let forward = e.evaluate(&[dx]);
        let backward = e.evaluate(&[-dx]);
        let finite_difference = (forward - backward) / (2.0 * dx);
        let analytic = 1.0_f64.exp();
        assert!((finite_difference - analytic).abs() < 1e-6);
    }

    #[test]
    fn atan2_derivative_matches_finite_difference() {
        let degree = 3;
        let y = Polynomial::constant(1, degree, 0.0) + x(degree);
        let x_poly = Polynomial::constant(1, degree, 5.0);
        let result = y.atan2(&x_poly);

        let dy = 1e-3;
        let forward = result.evaluate(&[dy]);
        let backward = result.evaluate(&[-dy]);
        let finite_difference = (forward - backward) / (2.0 * dy);
        // d/dy atan2(y, x0) at y = 0 is x0 / (x0^2 + y0^2) = 1/x0.
        assert!((finite_difference - 0.2).abs() < 1e-6);
    }

    #[test]
    fn vec3_norm_matches_euclidean_norm_with_a_polynomial_component() {
        let degree = 2;
        let r = Vec3::new(
            Polynomial::constant(1, degree, 3.0) + x(degree),
            Polynomial::constant(1, degree, 4.0),
            Polynomial::constant(1, degree, 0.0),
        );
        let n = norm3(&r);

        assert!((n.representative() - 5.0).abs() < 1e-12);

        let dx = 1e-3;
        let forward = n.evaluate(&[dx]);
        let backward = n.evaluate(&[-dx]);
        let finite_difference = (forward - backward) / (2.0 * dx);
        // d/dx sqrt((3+x)^2 + 16) at x = 0 is 3/5.
        assert!((finite_difference - 0.6).abs() < 1e-6);
    }
}
