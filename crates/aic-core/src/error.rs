//! Error types
//!
//! Every hazard inside the control cycle is numerical. Most of them are
//! resolved locally (regularization, projection, saturation) and never reach
//! the caller; the variants below are what remains observable at the edges.

use thiserror::Error;

/// Errors raised by the AIC core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AicError {
    #[error("Non-finite value in input `{field}`")]
    NonFiniteInput { field: &'static str },
    #[error("Non-finite intermediate value in `{stage}`")]
    NumericalOverflow { stage: &'static str },
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f64),
    #[error("Not a rotation matrix: orthogonality error {orthogonality:.3e}, det {determinant:.6}")]
    InvalidRotation { orthogonality: f64, determinant: f64 },
    #[error("Matrix is numerically singular")]
    SingularMatrix,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, AicError>;
