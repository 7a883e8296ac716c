//! Earth reference-frame constants (§6). These are convenience values only — nothing in the core
//! hard-codes a constant into a formula; every perturbation provider and transform takes its
//! physical parameters as constructor/call arguments (see the J2-constant open question in
//! `DESIGN.md`).

pub mod earth {
    /// Earth gravitational parameter, km^3/s^2.
    pub const MU: f64 = 3.986004414498200e5;

    /// Earth mean equatorial radius, km.
    pub const RADIUS: f64 = 6378.13646;

    /// J2 zonal harmonic coefficient, header/default value.
    pub const J2: f64 = 1.082635854e-3;

    /// J2 zonal harmonic coefficient used by the reference point-propagation run (scenario 2 of
    /// §8). Differs from [`J2`] in its last three digits; both are legitimate and the caller picks.
    pub const J2_REF: f64 = 1.082626111e-3;

    /// Earth rotation rate, rad/s.
    pub const ROTATION_RATE: f64 = 7.292115855306587e-5;
}
