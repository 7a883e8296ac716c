use thiserror::Error;

/// The error taxonomy surfaced by every fallible operation in this crate.
///
/// Mirrors the shape of nyx's `NyxError`: one `thiserror`-derived enum, matched exhaustively at
/// the caller boundary, never a panic for a numerically recoverable condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// `a = 0`, `r = 0`, or `h = 0` during a Cartesian<->Keplerian transform.
    #[error("invalid orbit: {reason}")]
    InvalidOrbit { reason: String },

    /// `nu <= 0`, `1 - p1^2 - p2^2 <= 0`, or `c^2 < 2 r^2 U` during a Cartesian<->GEqOE transform.
    #[error("transform domain error: {reason}")]
    TransformDomainError { reason: String },

    /// Newton-Raphson did not reach the requested tolerance within the iteration cap.
    #[error("root finder failed to converge after {iterations} iterations (last value {last_value})")]
    RootFailedToConverge { iterations: usize, last_value: f64 },

    /// The caller requested a state shape the chosen scalar kind does not support (currently:
    /// polynomial scalar + non-Cartesian shape).
    #[error("unsupported state shape `{shape}` for scalar kind `{scalar_kind}`")]
    UnsupportedStateShape {
        shape: &'static str,
        scalar_kind: &'static str,
    },

    /// Reserved for the configuration-driven external collaborator layer; the core itself never
    /// constructs this variant, but it is part of the public taxonomy so callers can match
    /// exhaustively across both layers.
    #[error("unsupported perturbation model: {model}")]
    UnsupportedPerturbationModel { model: String },
}
