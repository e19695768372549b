//! Standard gradient adaptation with σ-modification
//!
//! θ̇ = −γ Yᵀs − σθ − (β/γ)θ
//!
//! followed by projection onto the admissible inertia set. The information
//! matrix is accumulated for monitoring only; it does not shape the update.

use nalgebra::{DVector, Matrix3, Vector3};

use crate::dynamics::Regressor;

use super::config::EstimatorConfig;
use super::model::InertiaModel;
use super::state::EstimatorState;
use super::InertiaEstimator;

/// Gradient-descent inertia estimator
#[derive(Debug, Clone)]
pub struct GradientEstimator {
    config: EstimatorConfig,
    state: EstimatorState,
}

impl GradientEstimator {
    pub fn new(model: InertiaModel, inertia_init: &Matrix3<f64>, config: EstimatorConfig) -> Self {
        let state = EstimatorState::new(model, inertia_init, config.information_seed);
        Self { config, state }
    }
}

impl InertiaEstimator for GradientEstimator {
    fn model(&self) -> InertiaModel {
        self.state.model()
    }

    fn update(&mut self, regressor: &Regressor, s: &Vector3<f64>, dt: f64) {
        if !self.state.accepts(regressor, s, dt) {
            return;
        }

        let p = self.config.adaptation;
        let y = regressor.to_dmatrix();
        if !self.state.accumulate(&y, dt) {
            return;
        }
        let grad = y.transpose() * DVector::from_column_slice(s.as_slice());

        let theta = self.state.theta();
        let theta_dot = -p.gamma * grad - p.sigma * theta - (p.beta / p.gamma) * theta;

        self.state.integrate(&theta_dot, dt, &self.config);
    }

    fn state(&self) -> &EstimatorState {
        &self.state
    }

    fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn set_config(&mut self, config: EstimatorConfig) {
        self.config = config;
    }

    fn reset(&mut self, inertia_init: &Matrix3<f64>) {
        self.state = EstimatorState::new(self.state.model(), inertia_init, self.config.information_seed);
    }
}
