//! State shared by both adaptation laws: θ and the information matrix P

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use crate::dynamics::Regressor;
use crate::math::symmetrize;

use super::config::EstimatorConfig;
use super::model::InertiaModel;
use super::projection::project;

/// Parameter estimate θ and information matrix P(t) = P₀ + ∫ YᵀY dt
#[derive(Debug, Clone)]
pub struct EstimatorState {
    model: InertiaModel,
    theta: DVector<f64>,
    information: DMatrix<f64>,
}

impl EstimatorState {
    /// θ from the initial inertia guess, P₀ = seed · I
    pub fn new(model: InertiaModel, inertia_init: &Matrix3<f64>, information_seed: f64) -> Self {
        let n = model.num_params();
        Self {
            model,
            theta: model.theta_from_inertia(inertia_init),
            information: DMatrix::identity(n, n) * information_seed,
        }
    }

    pub fn model(&self) -> InertiaModel {
        self.model
    }

    pub fn theta(&self) -> &DVector<f64> {
        &self.theta
    }

    pub fn information(&self) -> &DMatrix<f64> {
        &self.information
    }

    pub fn information_determinant(&self) -> f64 {
        self.information.determinant()
    }

    pub fn inertia_estimate(&self) -> Matrix3<f64> {
        self.model.inertia_from_theta(&self.theta)
    }

    /// P ← P + dt · YᵀY; false (P untouched) if the sum overflows
    pub(crate) fn accumulate(&mut self, y: &DMatrix<f64>, dt: f64) -> bool {
        let mut information = &self.information + y.transpose() * y * dt;
        if !information.iter().all(|v| v.is_finite()) {
            tracing::warn!(dt, "information matrix overflow, update skipped");
            return false;
        }
        symmetrize(&mut information);
        self.information = information;
        true
    }

    /// θ ← θ + dt · θ̇, then project back onto the admissible set
    ///
    /// A non-finite step is dropped.
    pub(crate) fn integrate(&mut self, theta_dot: &DVector<f64>, dt: f64, config: &EstimatorConfig) {
        let step = theta_dot * dt;
        if !step.iter().all(|v| v.is_finite()) {
            tracing::warn!("non-finite parameter step, update skipped");
            return;
        }
        self.theta += step;
        project(self.model, &mut self.theta, &config.bounds, config.projection);
    }

    /// Whether an update with these inputs may touch the state
    ///
    /// Rejects a layout mismatch, non-finite data and non-positive dt; a
    /// rejected update leaves θ and P unchanged.
    pub(crate) fn accepts(&self, regressor: &Regressor, s: &Vector3<f64>, dt: f64) -> bool {
        if regressor.num_params() != self.model.num_params() {
            tracing::warn!(
                expected = self.model.num_params(),
                got = regressor.num_params(),
                "regressor layout does not match inertia model, update skipped"
            );
            return false;
        }
        if !(regressor.is_finite() && s.iter().all(|v| v.is_finite()) && dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "non-finite estimator input, update skipped");
            return false;
        }
        true
    }
}

/// Unit vector along `v`, or zero if `v` has no usable direction
pub(crate) fn normalize_or_zero(v: &DVector<f64>) -> DVector<f64> {
    let norm = v.norm();
    if norm > f64::EPSILON {
        v / norm
    } else {
        DVector::zeros(v.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seeded_information_is_definite() {
        let state = EstimatorState::new(InertiaModel::Full, &Matrix3::identity(), 1e-4);

        assert_eq!(state.information().shape(), (6, 6));
        assert_relative_eq!(state.information_determinant(), 1e-24, max_relative = 1e-9);
    }

    #[test]
    fn test_accumulate_adds_gram_matrix() {
        let mut state = EstimatorState::new(InertiaModel::Diagonal, &Matrix3::identity(), 0.0);
        let y = DMatrix::from_row_slice(3, 3, &[
            1.0, 0.0, 0.0,
            0.0, 2.0, 0.0,
            0.0, 0.0, 3.0,
        ]);
        state.accumulate(&y, 0.5);

        assert_relative_eq!(state.information()[(0, 0)], 0.5);
        assert_relative_eq!(state.information()[(1, 1)], 2.0);
        assert_relative_eq!(state.information()[(2, 2)], 4.5);
    }

    #[test]
    fn test_overflowing_information_is_rejected() {
        let mut state = EstimatorState::new(InertiaModel::Diagonal, &Matrix3::identity(), 1e-4);
        let y = DMatrix::from_element(3, 3, 1e200);

        assert!(!state.accumulate(&y, 0.01));
        assert!(state.information().iter().all(|v| v.is_finite()));
        assert_relative_eq!(state.information_determinant(), 1e-12, max_relative = 1e-9);
    }

    #[test]
    fn test_non_finite_step_is_dropped() {
        let mut state = EstimatorState::new(InertiaModel::Diagonal, &(Matrix3::identity() * 0.05), 1e-4);
        let theta_dot = DVector::from_vec(vec![f64::INFINITY, 0.0, 0.0]);

        state.integrate(&theta_dot, 0.01, &EstimatorConfig::default());

        assert_relative_eq!(state.inertia_estimate(), Matrix3::identity() * 0.05);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let z = normalize_or_zero(&DVector::zeros(3));
        assert_eq!(z, DVector::zeros(3));

        let u = normalize_or_zero(&DVector::from_vec(vec![3.0, 0.0, 4.0]));
        assert_relative_eq!(u.norm(), 1.0);
    }
}
