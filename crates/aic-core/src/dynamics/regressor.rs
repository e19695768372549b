//! Linear-in-parameters torque regressor
//!
//! Builds Y(Ω, α) such that
//!
//! ```text
//! τ = J α − Ω × (J Ω) = Y(Ω, α) θ
//! ```
//!
//! for two inertia parameterizations:
//!
//! - diagonal, θ = [Jxx, Jyy, Jzz]ᵀ (3×3 regressor)
//! - full symmetric, θ = [Jxx, Jyy, Jzz, Jxy, Jxz, Jyz]ᵀ (3×6 regressor)
//!
//! A sign error in any entry silently corrupts both the feedforward torque and
//! the learning signal, so both closed forms are checked against
//! [`rigid_body_torque`] by [`validate_diagonal`] / [`validate_full`].

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3x6, Vector3, Vector6};

use super::rigid_body::rigid_body_torque;

/// Default tolerance for regressor validation
pub const VALIDATION_TOLERANCE: f64 = 1e-5;

/// Regressor for diagonal inertia
///
/// ```text
/// Y = [ αx      ΩyΩz   −ΩyΩz ]
///     [ −ΩxΩz   αy      ΩxΩz ]
///     [ ΩxΩy   −ΩxΩy    αz   ]
/// ```
pub fn regressor_diagonal(omega: &Vector3<f64>, alpha: &Vector3<f64>) -> Matrix3<f64> {
    let (wx, wy, wz) = (omega.x, omega.y, omega.z);
    let (ax, ay, az) = (alpha.x, alpha.y, alpha.z);

    Matrix3::new(
        ax, wy * wz, -wy * wz,
        -wx * wz, ay, wx * wz,
        wx * wy, -wx * wy, az,
    )
}

/// Regressor for full symmetric inertia
///
/// Columns are the coefficients of Jxx, Jyy, Jzz, Jxy, Jxz, Jyz in
/// J α − Ω × (J Ω). Expanding row by row, e.g. for the x-axis:
///
/// ```text
/// τx = Jxx αx + (Jyy − Jzz) ΩyΩz + Jxy (αy + ΩxΩz)
///    + Jxz (αz − ΩxΩy) + Jyz (Ωz² − Ωy²)
/// ```
pub fn regressor_full(omega: &Vector3<f64>, alpha: &Vector3<f64>) -> Matrix3x6<f64> {
    let (wx, wy, wz) = (omega.x, omega.y, omega.z);
    let (ax, ay, az) = (alpha.x, alpha.y, alpha.z);

    Matrix3x6::new(
        // Jxx       Jyy        Jzz       Jxy              Jxz              Jyz
        ax,         wy * wz,   -wy * wz,  ay + wx * wz,    az - wx * wy,    wz * wz - wy * wy,
        -wx * wz,   ay,        wx * wz,   ax - wy * wz,    wx * wx - wz * wz, az + wx * wy,
        wx * wy,    -wx * wy,  az,        wy * wy - wx * wx, ax + wy * wz,  ay - wx * wz,
    )
}

/// Diagonal parameters [Jxx, Jyy, Jzz] of an inertia matrix
pub fn diagonal_parameters(j: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(j[(0, 0)], j[(1, 1)], j[(2, 2)])
}

/// Full symmetric parameters [Jxx, Jyy, Jzz, Jxy, Jxz, Jyz] of an inertia matrix
pub fn full_parameters(j: &Matrix3<f64>) -> Vector6<f64> {
    Vector6::new(j[(0, 0)], j[(1, 1)], j[(2, 2)], j[(0, 1)], j[(0, 2)], j[(1, 2)])
}

/// Check Y(Ω, α) θ against the direct torque model for a known diagonal J
pub fn validate_diagonal(
    j: &Matrix3<f64>,
    theta: &Vector3<f64>,
    omega: &Vector3<f64>,
    alpha: &Vector3<f64>,
    tol: f64,
) -> bool {
    let tau_true = rigid_body_torque(j, omega, alpha);
    let tau_regressor = regressor_diagonal(omega, alpha) * theta;
    (tau_true - tau_regressor).norm() < tol
}

/// Check Y(Ω, α) θ against the direct torque model for a known symmetric J
pub fn validate_full(
    j: &Matrix3<f64>,
    theta: &Vector6<f64>,
    omega: &Vector3<f64>,
    alpha: &Vector3<f64>,
    tol: f64,
) -> bool {
    let tau_true = rigid_body_torque(j, omega, alpha);
    let tau_regressor = regressor_full(omega, alpha) * theta;
    (tau_true - tau_regressor).norm() < tol
}

/// Regressor matrix for either parameterization
#[derive(Debug, Clone, PartialEq)]
pub enum Regressor {
    Diagonal(Matrix3<f64>),
    Full(Matrix3x6<f64>),
}

impl Regressor {
    /// Number of parameters (columns)
    pub fn num_params(&self) -> usize {
        match self {
            Regressor::Diagonal(_) => 3,
            Regressor::Full(_) => 6,
        }
    }

    /// Y θ; `theta` must have [`Self::num_params`] entries
    pub fn torque(&self, theta: &DVector<f64>) -> Vector3<f64> {
        debug_assert_eq!(theta.len(), self.num_params());
        match self {
            Regressor::Diagonal(y) => y * Vector3::new(theta[0], theta[1], theta[2]),
            Regressor::Full(y) => y * Vector6::from_column_slice(theta.as_slice()),
        }
    }

    /// Dynamically sized copy (3 × n) for the estimators
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        match self {
            Regressor::Diagonal(y) => DMatrix::from_column_slice(3, 3, y.as_slice()),
            Regressor::Full(y) => DMatrix::from_column_slice(3, 6, y.as_slice()),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Regressor::Diagonal(y) => y.iter().all(|v| v.is_finite()),
            Regressor::Full(y) => y.iter().all(|v| v.is_finite()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_symmetric_inertia() -> Matrix3<f64> {
        Matrix3::new(
            0.050, 0.002, -0.001,
            0.002, 0.045, 0.003,
            -0.001, 0.003, 0.030,
        )
    }

    #[test]
    fn test_diagonal_matches_torque_model() {
        let j = Matrix3::from_diagonal(&Vector3::new(0.05, 0.05, 0.03));
        let omega = Vector3::new(1.5, -0.7, 2.2);
        let alpha = Vector3::new(-3.0, 0.4, 1.1);

        let tau = regressor_diagonal(&omega, &alpha) * diagonal_parameters(&j);

        assert_relative_eq!(tau, rigid_body_torque(&j, &omega, &alpha), epsilon = 1e-12);
    }

    #[test]
    fn test_full_matches_torque_model() {
        let j = sample_symmetric_inertia();
        let omega = Vector3::new(-0.9, 1.3, 0.6);
        let alpha = Vector3::new(2.0, -1.0, 0.25);

        let tau = regressor_full(&omega, &alpha) * full_parameters(&j);

        assert_relative_eq!(tau, rigid_body_torque(&j, &omega, &alpha), epsilon = 1e-12);
    }

    #[test]
    fn test_full_reduces_to_diagonal() {
        let omega = Vector3::new(0.3, 0.2, -1.0);
        let alpha = Vector3::new(0.1, 0.0, 0.7);

        let y_full = regressor_full(&omega, &alpha);
        let y_diag = regressor_diagonal(&omega, &alpha);

        assert_relative_eq!(y_full.fixed_view::<3, 3>(0, 0).into_owned(), y_diag, epsilon = 1e-15);
    }

    #[test]
    fn test_validate_detects_wrong_parameters() {
        let j = sample_symmetric_inertia();
        let omega = Vector3::new(1.0, 2.0, 3.0);
        let alpha = Vector3::new(0.5, 0.5, 0.5);

        let mut theta = full_parameters(&j);
        assert!(validate_full(&j, &theta, &omega, &alpha, VALIDATION_TOLERANCE));

        theta[5] += 0.01;
        assert!(!validate_full(&j, &theta, &omega, &alpha, VALIDATION_TOLERANCE));
    }

    #[test]
    fn test_regressor_enum_torque() {
        let j = sample_symmetric_inertia();
        let omega = Vector3::new(0.4, -0.4, 0.9);
        let alpha = Vector3::new(1.0, 0.0, -2.0);

        let y = Regressor::Full(regressor_full(&omega, &alpha));
        let theta = DVector::from_column_slice(full_parameters(&j).as_slice());

        assert_eq!(y.num_params(), 6);
        assert_relative_eq!(y.torque(&theta), rigid_body_torque(&j, &omega, &alpha), epsilon = 1e-12);

        let dm = y.to_dmatrix();
        assert_eq!(dm.shape(), (3, 6));
        assert_relative_eq!(dm[(2, 4)], alpha.x + omega.y * omega.z, epsilon = 1e-15);
    }
}
