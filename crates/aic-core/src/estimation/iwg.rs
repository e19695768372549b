//! Information-Weighted Gradient (IWG) adaptation
//!
//! θ̇ = −γ (I + λP)⁻¹ Yᵀs − σθ − (β/γ)θ + τ_ee
//!
//! The weighting (I + λP)⁻¹ shrinks the step along directions that the
//! accumulated information already pins down and leaves poorly excited
//! directions free to adapt. While P is still rank deficient
//! (|det P| < ε_rank) the excitation-enhancing term
//! τ_ee = γ_ee · Yᵀs/‖Yᵀs‖ pushes the estimate along the current gradient
//! direction; afterwards it is exactly zero.
//!
//! Reference: Boffa et al., "Excitation-Aware Least-Squares".

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use crate::dynamics::Regressor;
use crate::math::regularized_inverse;

use super::config::EstimatorConfig;
use super::model::InertiaModel;
use super::state::{normalize_or_zero, EstimatorState};
use super::InertiaEstimator;

/// Information-weighted inertia estimator
#[derive(Debug, Clone)]
pub struct IwgEstimator {
    config: EstimatorConfig,
    state: EstimatorState,
}

impl IwgEstimator {
    pub fn new(model: InertiaModel, inertia_init: &Matrix3<f64>, config: EstimatorConfig) -> Self {
        let state = EstimatorState::new(model, inertia_init, config.information_seed);
        Self { config, state }
    }

    /// (I + λP)⁻¹ for the current information matrix
    pub fn weighting_inverse(&self) -> DMatrix<f64> {
        let n = self.state.model().num_params();
        let m = DMatrix::identity(n, n) + self.state.information() * self.config.adaptation.lambda;
        regularized_inverse(&m, self.config.regularization)
    }

    /// Whether the excitation-enhancing term is currently active
    pub fn excitation_enhancing_active(&self) -> bool {
        self.config.adaptation.gamma_ee > 0.0
            && self.state.information_determinant().abs() < self.config.rank_deficiency_threshold
    }
}

impl InertiaEstimator for IwgEstimator {
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

        let yts = y.transpose() * DVector::from_column_slice(s.as_slice());
        let weighted = self.weighting_inverse() * &yts;

        let n = yts.len();
        let ee_term = if self.excitation_enhancing_active() {
            normalize_or_zero(&yts) * p.gamma_ee
        } else {
            DVector::zeros(n)
        };

        let theta = self.state.theta();
        let theta_dot = -p.gamma * weighted - p.sigma * theta - (p.beta / p.gamma) * theta + ee_term;

        tracing::trace!(
            det_p = self.state.information_determinant(),
            step = theta_dot.norm() * dt,
            "iwg update"
        );

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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::dynamics::regressor_diagonal;
    use crate::estimation::AdaptationParams;

    fn no_leak_config(gamma_ee: f64) -> EstimatorConfig {
        EstimatorConfig {
            adaptation: AdaptationParams { sigma: 0.0, beta: 0.0, gamma_ee, ..Default::default() },
            ..Default::default()
        }
    }

    fn initial_inertia() -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(0.05, 0.05, 0.05))
    }

    #[test]
    fn test_first_step_matches_plain_gradient() {
        // With P ≈ 0 the weighting is ≈ I
        let mut iwg = IwgEstimator::new(InertiaModel::Diagonal, &initial_inertia(), no_leak_config(0.0));
        let y = Regressor::Diagonal(regressor_diagonal(&Vector3::zeros(), &Vector3::new(0.1, 0.0, 0.0)));

        iwg.update(&y, &Vector3::new(0.1, 0.0, 0.0), 0.01);

        let expected = 0.05 - 1.5 * 0.01 * 0.01;
        assert_relative_eq!(iwg.theta()[0], expected, max_relative = 1e-5);
    }

    #[test]
    fn test_weighting_slows_well_observed_directions() {
        let mut iwg = IwgEstimator::new(InertiaModel::Diagonal, &initial_inertia(), no_leak_config(0.0));
        let y = Regressor::Diagonal(regressor_diagonal(&Vector3::zeros(), &Vector3::new(3.0, 0.0, 0.0)));

        // Excite only the x-direction for a while with zero error
        for _ in 0..1000 {
            iwg.update(&y, &Vector3::zeros(), 0.01);
        }

        let w = iwg.weighting_inverse();
        // x-direction: 1 / (1 + λ·(1e-4 + 90))
        assert_relative_eq!(w[(0, 0)], 1.0 / (1.0 + 0.04 * (1e-4 + 90.0)), max_relative = 1e-6);
        // y, z untouched
        assert_relative_eq!(w[(1, 1)], 1.0 / (1.0 + 0.04 * 1e-4), max_relative = 1e-9);
        assert!(w[(0, 0)] < w[(1, 1)]);
    }

    #[test]
    fn test_excitation_term_only_while_rank_deficient() {
        let mut iwg = IwgEstimator::new(InertiaModel::Diagonal, &initial_inertia(), no_leak_config(0.01));
        assert!(iwg.excitation_enhancing_active());

        let y = Regressor::Diagonal(regressor_diagonal(&Vector3::zeros(), &Vector3::new(1.0, 1.0, 1.0)));
        for _ in 0..100 {
            iwg.update(&y, &Vector3::zeros(), 0.01);
        }

        // det P = (1e-4 + 1)^3 ≫ 1e-6
        assert!(!iwg.excitation_enhancing_active());
        assert!(iwg.is_persistently_excited());
    }

    #[test]
    fn test_excitation_term_is_zero_without_gradient() {
        // Zero regressor: Yᵀs = 0, normalization must not produce NaN
        let mut iwg = IwgEstimator::new(InertiaModel::Full, &initial_inertia(), no_leak_config(0.01));
        let y = InertiaModel::Full.regressor(&Vector3::zeros(), &Vector3::zeros());

        iwg.update(&y, &Vector3::new(1.0, 1.0, 1.0), 0.01);

        assert!(iwg.theta().iter().all(|v| v.is_finite()));
        assert_relative_eq!(iwg.inertia_estimate(), initial_inertia(), epsilon = 1e-15);
    }

    #[test]
    fn test_not_excited_initially() {
        let iwg = IwgEstimator::new(InertiaModel::Diagonal, &initial_inertia(), EstimatorConfig::default());
        assert!(!iwg.is_persistently_excited());
        assert_relative_eq!(iwg.information_determinant(), 1e-12, max_relative = 1e-9);
    }
}
