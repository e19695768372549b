//! Controller configuration
//!
//! Defaults are conservative values for a small multicopter; tune the gains
//! for the actual airframe.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{AicError, Result};
use crate::estimation::{EstimatorConfig, EstimatorKind, InertiaModel};

use super::timing::DtBounds;

/// Minimum accepted torque saturation limit [N·m]
pub const MIN_TORQUE_LIMIT: f64 = 0.01;

/// Default initial inertia guess [kg·m²]
pub fn default_inertia() -> Matrix3<f64> {
    Matrix3::from_diagonal(&Vector3::new(0.040, 0.040, 0.025))
}

/// Feedback gains, per axis (roll, pitch, yaw)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlGains {
    /// Attitude error gain K_R
    pub k_r: Vector3<f64>,
    /// Angular velocity error gain K_Ω
    pub k_omega: Vector3<f64>,
    /// Robust damping gain K on the filtered composite error
    pub k_robust: Vector3<f64>,
    /// Composite error weight c in s = e_Ω + c·e_R
    pub c: f64,
}

impl Default for ControlGains {
    fn default() -> Self {
        Self {
            k_r: Vector3::new(5.0, 5.0, 3.0),
            k_omega: Vector3::new(0.3, 0.3, 0.2),
            k_robust: Vector3::new(0.1, 0.1, 0.1),
            c: 2.0,
        }
    }
}

impl ControlGains {
    /// Gains must be finite and non-negative; a zero gain disables its term
    pub fn validate(&self) -> Result<()> {
        for (name, gain) in [("k_r", &self.k_r), ("k_omega", &self.k_omega), ("k_robust", &self.k_robust)] {
            if gain.iter().any(|g| !(g.is_finite() && *g >= 0.0)) {
                return Err(AicError::InvalidConfig(format!("{name} must be non-negative, got {gain:?}")));
            }
        }
        if !(self.c.is_finite() && self.c >= 0.0) {
            return Err(AicError::InvalidConfig(format!("c must be non-negative, got {}", self.c)));
        }
        Ok(())
    }
}

/// Full controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Inertia parameterization
    pub model: InertiaModel,
    /// Adaptation law
    pub estimator: EstimatorKind,
    pub gains: ControlGains,
    pub estimation: EstimatorConfig,
    /// Per-axis torque limit τ_max [N·m]
    pub tau_max: f64,
    /// Composite error filter coefficient in [0, 1] (larger = less smoothing)
    pub filter_alpha: f64,
    /// Admissible Δt range [s]
    pub dt_bounds: DtBounds,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            model: InertiaModel::Diagonal,
            estimator: EstimatorKind::InformationWeighted,
            gains: ControlGains::default(),
            estimation: EstimatorConfig::default(),
            tau_max: 0.05,
            filter_alpha: 0.1,
            dt_bounds: DtBounds::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        self.gains.validate()?;
        self.estimation.validate()?;

        if !(self.tau_max.is_finite() && self.tau_max >= MIN_TORQUE_LIMIT) {
            return Err(AicError::InvalidConfig(format!(
                "tau_max must be at least {MIN_TORQUE_LIMIT}, got {}",
                self.tau_max
            )));
        }
        if !(0.0..=1.0).contains(&self.filter_alpha) {
            return Err(AicError::InvalidConfig(format!(
                "filter_alpha must lie in [0, 1], got {}",
                self.filter_alpha
            )));
        }
        let dt = &self.dt_bounds;
        if !(dt.min > 0.0 && dt.min <= dt.max && dt.max.is_finite()) {
            return Err(AicError::InvalidConfig(format!("invalid dt bounds [{}, {}]", dt.min, dt.max)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_gain_rejected() {
        let mut config = ControllerConfig::default();
        config.gains.k_omega.y = -0.1;
        assert!(matches!(config.validate(), Err(AicError::InvalidConfig(_))));
    }

    #[test]
    fn test_filter_alpha_range() {
        let config = ControllerConfig { filter_alpha: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dt_bounds_checked() {
        let config = ControllerConfig {
            dt_bounds: DtBounds { min: 0.1, max: 0.01 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_gain_disables_term() {
        let gains = ControlGains { k_robust: Vector3::zeros(), c: 0.0, ..Default::default() };
        assert!(gains.validate().is_ok());

        let gains = ControlGains { c: f64::NAN, ..Default::default() };
        assert!(matches!(gains.validate(), Err(AicError::InvalidConfig(_))));
    }
}
