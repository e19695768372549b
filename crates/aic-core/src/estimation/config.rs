//! Estimator configuration

use serde::{Deserialize, Serialize};

use crate::error::{AicError, Result};

use super::projection::ProjectionMethod;

/// Adaptation law parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationParams {
    /// Adaptation gain γ (learning rate)
    pub gamma: f64,
    /// Leakage coefficient σ (σ-modification)
    pub sigma: f64,
    /// Regularization gain β, applied as (β/γ)·θ
    pub beta: f64,
    /// Information weighting factor λ in (I + λP)⁻¹, IWG only
    pub lambda: f64,
    /// Excitation-enhancing weight γ_ee, IWG only
    pub gamma_ee: f64,
}

impl Default for AdaptationParams {
    fn default() -> Self {
        Self {
            gamma: 1.5,
            sigma: 1e-4,
            beta: 0.01,
            lambda: 0.04,
            gamma_ee: 0.001,
        }
    }
}

impl AdaptationParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(AicError::InvalidConfig(format!("gamma must be positive, got {}", self.gamma)));
        }
        for (name, value) in [("sigma", self.sigma), ("beta", self.beta), ("gamma_ee", self.gamma_ee)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AicError::InvalidConfig(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(AicError::InvalidConfig(format!("lambda must lie in [0, 1], got {}", self.lambda)));
        }
        Ok(())
    }
}

/// Admissible range for the inertia eigenvalues [kg·m²]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorBounds {
    pub j_min: f64,
    pub j_max: f64,
}

impl Default for EstimatorBounds {
    fn default() -> Self {
        Self { j_min: 0.01, j_max: 1.0 }
    }
}

impl EstimatorBounds {
    pub fn validate(&self) -> Result<()> {
        if self.j_min > 0.0 && self.j_min < self.j_max && self.j_max.is_finite() {
            Ok(())
        } else {
            Err(AicError::InvalidConfig(format!(
                "inertia bounds must satisfy 0 < j_min < j_max, got [{}, {}]",
                self.j_min, self.j_max
            )))
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.j_min, self.j_max)
    }
}

/// Full estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub adaptation: AdaptationParams,
    pub bounds: EstimatorBounds,
    /// Initial information matrix P₀ = seed · I (never zero)
    pub information_seed: f64,
    /// |det P| above which the trajectory counts as persistently exciting
    pub excitation_threshold: f64,
    /// |det P| below which the excitation-enhancing term is active
    pub rank_deficiency_threshold: f64,
    /// ε added to the diagonal when I + λP is singular
    pub regularization: f64,
    /// How θ is returned to the admissible set after each step
    pub projection: ProjectionMethod,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            adaptation: AdaptationParams::default(),
            bounds: EstimatorBounds::default(),
            information_seed: 1e-4,
            excitation_threshold: 1e-4,
            rank_deficiency_threshold: 1e-6,
            regularization: 1e-6,
            projection: ProjectionMethod::default(),
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        self.adaptation.validate()?;
        self.bounds.validate()?;
        if !(self.information_seed.is_finite() && self.information_seed > 0.0) {
            return Err(AicError::InvalidConfig("information_seed must be positive".into()));
        }
        if !(self.regularization.is_finite() && self.regularization > 0.0) {
            return Err(AicError::InvalidConfig("regularization must be positive".into()));
        }
        for (name, threshold) in [
            ("excitation_threshold", self.excitation_threshold),
            ("rank_deficiency_threshold", self.rank_deficiency_threshold),
        ] {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(AicError::InvalidConfig(format!("{name} must be non-negative, got {threshold}")));
            }
        }
        Ok(())
    }
}
