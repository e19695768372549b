//! Adaptive inertia-aware composite attitude controller
//!
//! Implements the per-cycle control law:
//!
//! ```text
//! s        = e_Ω + c·e_R,          s_f ← α·s + (1 − α)·s_f
//! α_cmd    = E α_d − Ω^ E Ω_d,     E = RᵀR_d
//! Y        = Y(Ω, α_cmd),          θ̂ ← estimator.update(Y, s_f, Δt)
//! τ        = sat(−K_R⊙e_R − K_Ω⊙e_Ω + Y θ̂ − K⊙s_f, τ_max)
//! ```
//!
//! The geometric PD part stabilizes, the adaptive feedforward cancels the
//! rigid-body torque with the learned inertia and the robust term damps the
//! filtered composite error.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{AicError, Result};
use crate::estimation::{AdaptationParams, Estimator, InertiaEstimator, InertiaModel};
use crate::math::{
    angular_velocity_error, attitude_error, check_rotation, commanded_angular_accel, ROTATION_TOLERANCE,
};

use super::config::{ControlGains, ControllerConfig, MIN_TORQUE_LIMIT};
use super::filter::LowPassFilter;
use super::timing::clamp_dt;

/// Measured attitude state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttitudeState {
    /// Body-to-world rotation R
    pub rotation: Matrix3<f64>,
    /// Body angular velocity Ω [rad/s]
    pub angular_velocity: Vector3<f64>,
}

impl Default for AttitudeState {
    fn default() -> Self {
        Self {
            rotation: Matrix3::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl AttitudeState {
    pub fn new(rotation: Matrix3<f64>, angular_velocity: Vector3<f64>) -> Self {
        Self { rotation, angular_velocity }
    }

    /// Construct after checking that `rotation` lies on SO(3)
    pub fn checked(rotation: Matrix3<f64>, angular_velocity: Vector3<f64>) -> Result<Self> {
        let state = Self::new(rotation, angular_velocity);
        state.check_finite()?;
        check_rotation(&state.rotation, ROTATION_TOLERANCE)?;
        Ok(state)
    }

    fn check_finite(&self) -> Result<()> {
        ensure_finite("rotation", self.rotation.iter())?;
        ensure_finite("angular_velocity", self.angular_velocity.iter())
    }
}

/// Desired attitude trajectory sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttitudeReference {
    /// Desired rotation R_d
    pub rotation: Matrix3<f64>,
    /// Desired angular velocity Ω_d [rad/s]
    pub angular_velocity: Vector3<f64>,
    /// Desired angular acceleration α_d [rad/s²]
    pub angular_acceleration: Vector3<f64>,
}

impl Default for AttitudeReference {
    fn default() -> Self {
        Self::hold(Matrix3::identity())
    }
}

impl AttitudeReference {
    pub fn new(rotation: Matrix3<f64>, angular_velocity: Vector3<f64>, angular_acceleration: Vector3<f64>) -> Self {
        Self { rotation, angular_velocity, angular_acceleration }
    }

    /// Constant attitude setpoint
    pub fn hold(rotation: Matrix3<f64>) -> Self {
        Self::new(rotation, Vector3::zeros(), Vector3::zeros())
    }

    /// Construct after checking that `rotation` lies on SO(3)
    pub fn checked(
        rotation: Matrix3<f64>,
        angular_velocity: Vector3<f64>,
        angular_acceleration: Vector3<f64>,
    ) -> Result<Self> {
        let reference = Self::new(rotation, angular_velocity, angular_acceleration);
        reference.check_finite()?;
        check_rotation(&reference.rotation, ROTATION_TOLERANCE)?;
        Ok(reference)
    }

    fn check_finite(&self) -> Result<()> {
        ensure_finite("desired_rotation", self.rotation.iter())?;
        ensure_finite("desired_angular_velocity", self.angular_velocity.iter())?;
        ensure_finite("desired_angular_acceleration", self.angular_acceleration.iter())
    }
}

fn ensure_finite<'a>(field: &'static str, mut values: impl Iterator<Item = &'a f64>) -> Result<()> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(AicError::NonFiniteInput { field })
    }
}

fn ensure_computed<'a>(stage: &'static str, mut values: impl Iterator<Item = &'a f64>) -> Result<()> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(AicError::NumericalOverflow { stage })
    }
}

/// How a cycle's torque was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStatus {
    /// Full control law evaluated
    Nominal,
    /// Inputs rejected; previous torque reissued, nothing learned
    Held,
}

/// Result of one control cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlOutput {
    /// Saturated torque command [N·m]
    pub torque: Vector3<f64>,
    /// Torque before saturation [N·m]
    pub unsaturated: Vector3<f64>,
    /// At least one axis was clipped to ±τ_max
    pub saturated: bool,
    pub attitude_error: Vector3<f64>,
    pub angular_velocity_error: Vector3<f64>,
    /// Filtered composite error s_f
    pub composite_error: Vector3<f64>,
    pub status: CycleStatus,
}

impl ControlOutput {
    fn held(torque: Vector3<f64>) -> Self {
        Self {
            torque,
            unsaturated: torque,
            saturated: false,
            attitude_error: Vector3::zeros(),
            angular_velocity_error: Vector3::zeros(),
            composite_error: Vector3::zeros(),
            status: CycleStatus::Held,
        }
    }
}

/// Monitoring snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub inertia: Matrix3<f64>,
    pub persistently_excited: bool,
    pub information_determinant: f64,
    /// Whether the last nominal cycle saturated
    pub saturated: bool,
    /// Nominal cycles since construction or reset
    pub cycles: u64,
}

/// Clamp each component to [−τ_max, τ_max]; reports whether any was clipped
pub fn saturate(torque: &Vector3<f64>, tau_max: f64) -> (Vector3<f64>, bool) {
    let clamped = torque.map(|t| t.clamp(-tau_max, tau_max));
    (clamped, clamped != *torque)
}

/// Composite adaptive attitude controller
///
/// Owns the estimator, the composite error filter and the last issued
/// torque. Every call to [`Self::compute_torque`] mutates that state, so one
/// instance belongs to one control loop.
#[derive(Debug, Clone)]
pub struct CompositeController {
    config: ControllerConfig,
    estimator: Estimator,
    filter: LowPassFilter,
    last_torque: Vector3<f64>,
    last_saturated: bool,
    cycles: u64,
}

impl CompositeController {
    /// Create a controller starting from the inertia guess `inertia_init`
    pub fn new(inertia_init: &Matrix3<f64>, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        ensure_finite("inertia_init", inertia_init.iter())?;

        let estimator = Estimator::new(config.estimator, config.model, inertia_init, config.estimation.clone());
        let filter = LowPassFilter::new(config.filter_alpha);

        tracing::info!(
            model = ?config.model,
            estimator = ?config.estimator,
            tau_max = config.tau_max,
            "composite attitude controller initialized"
        );

        Ok(Self {
            config,
            estimator,
            filter,
            last_torque: Vector3::zeros(),
            last_saturated: false,
            cycles: 0,
        })
    }

    /// Controller with default configuration
    pub fn with_defaults(inertia_init: &Matrix3<f64>) -> Result<Self> {
        Self::new(inertia_init, ControllerConfig::default())
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn model(&self) -> InertiaModel {
        self.config.model
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn gains(&self) -> &ControlGains {
        &self.config.gains
    }

    pub fn set_control_gains(&mut self, gains: ControlGains) -> Result<()> {
        gains.validate()?;
        tracing::info!(?gains, "control gains updated");
        self.config.gains = gains;
        Ok(())
    }

    /// Replace γ, σ, β and γ_ee; λ is left as configured
    pub fn set_adaptation_params(&mut self, gamma: f64, sigma: f64, beta: f64, gamma_ee: f64) -> Result<()> {
        let params = AdaptationParams {
            gamma,
            sigma,
            beta,
            gamma_ee,
            ..self.config.estimation.adaptation
        };
        params.validate()?;
        tracing::info!(gamma, sigma, beta, gamma_ee, "adaptation parameters updated");
        self.update_adaptation(params);
        Ok(())
    }

    /// Set the information weighting λ, clamped to [0, 1]
    pub fn set_information_weighting(&mut self, lambda: f64) {
        let lambda = if lambda.is_nan() { 0.0 } else { lambda.clamp(0.0, 1.0) };
        let params = AdaptationParams { lambda, ..self.config.estimation.adaptation };
        tracing::info!(lambda, "information weighting updated");
        self.update_adaptation(params);
    }

    fn update_adaptation(&mut self, params: AdaptationParams) {
        self.config.estimation.adaptation = params;
        self.estimator.set_config(self.config.estimation.clone());
    }

    /// Set τ_max; values below 0.01 N·m are raised to 0.01
    pub fn set_saturation_limit(&mut self, tau_max: f64) {
        let tau_max = if tau_max.is_nan() { MIN_TORQUE_LIMIT } else { tau_max.max(MIN_TORQUE_LIMIT) };
        tracing::info!(tau_max, "saturation limit updated");
        self.config.tau_max = tau_max;
    }

    /// Set the composite error filter coefficient, clamped to [0, 1]
    pub fn set_filter_bandwidth(&mut self, alpha: f64) {
        let alpha = if alpha.is_nan() { self.config.filter_alpha } else { alpha.clamp(0.0, 1.0) };
        self.filter.set_alpha(alpha);
        self.config.filter_alpha = self.filter.alpha();
    }

    /// One control cycle
    ///
    /// Non-finite inputs, or finite inputs large enough to overflow the
    /// regressor or the torque, reject the cycle without touching the
    /// learned state; the previously issued torque is returned with
    /// [`CycleStatus::Held`].
    pub fn compute_torque(&mut self, state: &AttitudeState, reference: &AttitudeReference, dt: f64) -> ControlOutput {
        match self.try_compute_torque(state, reference, dt) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(%err, "control cycle rejected, holding previous torque");
                ControlOutput::held(self.last_torque)
            }
        }
    }

    /// One control cycle, reporting rejected inputs as errors
    pub fn try_compute_torque(
        &mut self,
        state: &AttitudeState,
        reference: &AttitudeReference,
        dt: f64,
    ) -> Result<ControlOutput> {
        state.check_finite()?;
        reference.check_finite()?;
        let dt = clamp_dt(dt, &self.config.dt_bounds).ok_or(AicError::InvalidTimestep(dt))?;

        let r = &state.rotation;
        let omega = &state.angular_velocity;
        let r_d = &reference.rotation;
        let omega_d = &reference.angular_velocity;
        let gains = &self.config.gains;

        let e_r = attitude_error(r, r_d);
        let e_omega = angular_velocity_error(omega, r, r_d, omega_d);

        let s = e_omega + e_r * gains.c;

        // Filter and estimator are staged and only committed once the torque is finite
        let mut filter = self.filter.clone();
        let s_filtered = filter.update(&s);

        let alpha_cmd = commanded_angular_accel(r, r_d, omega, omega_d, &reference.angular_acceleration);
        let regressor = self.config.model.regressor(omega, &alpha_cmd);
        if !regressor.is_finite() {
            return Err(AicError::NumericalOverflow { stage: "regressor" });
        }

        let tau_pd = -gains.k_r.component_mul(&e_r) - gains.k_omega.component_mul(&e_omega);
        let tau_robust = -gains.k_robust.component_mul(&s_filtered);
        ensure_computed("feedback", (tau_pd + tau_robust).iter())?;

        let mut estimator = self.estimator.clone();
        estimator.update(&regressor, &s_filtered, dt);
        let tau_adaptive = regressor.torque(estimator.theta());

        let unsaturated = tau_pd + tau_adaptive + tau_robust;
        ensure_computed("torque", unsaturated.iter())?;
        let (torque, saturated) = saturate(&unsaturated, self.config.tau_max);

        tracing::trace!(
            e_r = ?e_r,
            s = ?s_filtered,
            tau = ?torque,
            saturated,
            "control cycle"
        );

        self.filter = filter;
        self.estimator = estimator;
        self.last_torque = torque;
        self.last_saturated = saturated;
        self.cycles += 1;

        Ok(ControlOutput {
            torque,
            unsaturated,
            saturated,
            attitude_error: e_r,
            angular_velocity_error: e_omega,
            composite_error: s_filtered,
            status: CycleStatus::Nominal,
        })
    }

    pub fn inertia_estimate(&self) -> Matrix3<f64> {
        self.estimator.inertia_estimate()
    }

    pub fn is_persistently_excited(&self) -> bool {
        self.estimator.is_persistently_excited()
    }

    /// det P, the scalar learning-progress indicator
    pub fn information_quality(&self) -> f64 {
        self.estimator.information_determinant()
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            inertia: self.inertia_estimate(),
            persistently_excited: self.is_persistently_excited(),
            information_determinant: self.information_quality(),
            saturated: self.last_saturated,
            cycles: self.cycles,
        }
    }

    /// Restart learning from `inertia_init` and clear the filter and held torque
    pub fn reset(&mut self, inertia_init: &Matrix3<f64>) -> Result<()> {
        ensure_finite("inertia_init", inertia_init.iter())?;
        self.estimator.reset(inertia_init);
        self.filter.reset(Vector3::zeros());
        self.last_torque = Vector3::zeros();
        self.last_saturated = false;
        self.cycles = 0;
        tracing::info!("composite attitude controller reset");
        Ok(())
    }
}
