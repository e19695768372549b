//! Inertia parameterizations
//!
//! Maps between the 3×3 inertia tensor and the parameter vector θ the
//! estimators learn.

use nalgebra::{DVector, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::{regressor_diagonal, regressor_full, Regressor};

/// Which inertia parameters are learned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InertiaModel {
    /// θ = [Jxx, Jyy, Jzz]
    #[default]
    Diagonal,
    /// θ = [Jxx, Jyy, Jzz, Jxy, Jxz, Jyz]
    Full,
}

impl InertiaModel {
    /// Length of θ
    pub fn num_params(self) -> usize {
        match self {
            InertiaModel::Diagonal => 3,
            InertiaModel::Full => 6,
        }
    }

    /// Extract θ from an inertia tensor (off-diagonals read from the upper triangle)
    pub fn theta_from_inertia(self, j: &Matrix3<f64>) -> DVector<f64> {
        match self {
            InertiaModel::Diagonal => DVector::from_vec(vec![j[(0, 0)], j[(1, 1)], j[(2, 2)]]),
            InertiaModel::Full => DVector::from_vec(vec![
                j[(0, 0)],
                j[(1, 1)],
                j[(2, 2)],
                j[(0, 1)],
                j[(0, 2)],
                j[(1, 2)],
            ]),
        }
    }

    /// Rebuild the (symmetric) inertia tensor from θ
    pub fn inertia_from_theta(self, theta: &DVector<f64>) -> Matrix3<f64> {
        match self {
            InertiaModel::Diagonal => Matrix3::from_diagonal(&Vector3::new(theta[0], theta[1], theta[2])),
            InertiaModel::Full => Matrix3::new(
                theta[0], theta[3], theta[4],
                theta[3], theta[1], theta[5],
                theta[4], theta[5], theta[2],
            ),
        }
    }

    /// Regressor Y(Ω, α) in this model's parameter layout
    pub fn regressor(self, omega: &Vector3<f64>, alpha: &Vector3<f64>) -> Regressor {
        match self {
            InertiaModel::Diagonal => Regressor::Diagonal(regressor_diagonal(omega, alpha)),
            InertiaModel::Full => Regressor::Full(regressor_full(omega, alpha)),
        }
    }
}
