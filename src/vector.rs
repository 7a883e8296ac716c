//! Fixed-length-3 vector arithmetic over any [`Scalar`].
//!
//! A hand-rolled `Vec3<S>` rather than `nalgebra::Vector3<S>`: nalgebra's generic arithmetic
//! requires `S: nalgebra::Scalar + Zero + One + ClosedAdd + ...`, and `Zero::zero()`/`One::one()`
//! have no way to carry the polynomial scalar's runtime variable-count/degree. This module mirrors
//! the free-function surface of the source's `vector::geometry` and the teacher's `utils.rs`.

use crate::scalar::Scalar;

/// A triple over `S`. A six-vector (Cartesian state) is just a pair of these.
#[derive(Clone, Debug)]
pub struct Vec3<S: Scalar> {
    pub x: S,
    pub y: S,
    pub z: S,
}

impl<S: Scalar> Vec3<S> {
    pub fn new(x: S, y: S, z: S) -> Self {
        Vec3 { x, y, z }
    }

    pub fn from_array(a: [S; 3]) -> Self {
        let [x, y, z] = a;
        Vec3 { x, y, z }
    }

    pub fn into_array(self) -> [S; 3] {
        [self.x, self.y, self.z]
    }

    pub fn add(&self, rhs: &Vec3<S>) -> Vec3<S> {
        Vec3::new(
            self.x.clone() + rhs.x.clone(),
            self.y.clone() + rhs.y.clone(),
            self.z.clone() + rhs.z.clone(),
        )
    }

    pub fn sub(&self, rhs: &Vec3<S>) -> Vec3<S> {
        Vec3::new(
            self.x.clone() - rhs.x.clone(),
            self.y.clone() - rhs.y.clone(),
            self.z.clone() - rhs.z.clone(),
        )
    }

    pub fn neg(&self) -> Vec3<S> {
        Vec3::new(-self.x.clone(), -self.y.clone(), -self.z.clone())
    }

    /// Scalar times vector.
    pub fn scale(&self, k: &S) -> Vec3<S> {
        Vec3::new(
            k.clone() * self.x.clone(),
            k.clone() * self.y.clone(),
            k.clone() * self.z.clone(),
        )
    }

    /// Vector divided by a scalar.
    pub fn div_scalar(&self, k: &S) -> Vec3<S> {
        Vec3::new(
            self.x.clone() / k.clone(),
            self.y.clone() / k.clone(),
            self.z.clone() / k.clone(),
        )
    }
}

/// `R . V`
pub fn dot3<S: Scalar>(a: &Vec3<S>, b: &Vec3<S>) -> S {
    a.x.clone() * b.x.clone() + a.y.clone() * b.y.clone() + a.z.clone() * b.z.clone()
}

/// `R x V`
pub fn cross3<S: Scalar>(a: &Vec3<S>, b: &Vec3<S>) -> Vec3<S> {
    Vec3::new(
        a.y.clone() * b.z.clone() - a.z.clone() * b.y.clone(),
        a.z.clone() * b.x.clone() - a.x.clone() * b.z.clone(),
        a.x.clone() * b.y.clone() - a.y.clone() * b.x.clone(),
    )
}

/// `sqrt(dot3(v, v))`.
///
/// Precondition for the polynomial scalar kind: `dot3(v, v)` must stay positive over the sampled
/// domain for the square root's Taylor expansion (around the constant term) to be well-defined.
/// No guard is implemented here, matching the source this crate is grounded on — see the open
/// question recorded in `DESIGN.md`.
pub fn norm3<S: Scalar>(v: &Vec3<S>) -> S {
    dot3(v, v).sqrt()
}
