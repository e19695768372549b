//! Closed-loop attitude simulation
//!
//! Runs a [`CompositeController`] against a rigid body whose inertia the
//! controller does not know.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::control::{AttitudeReference, AttitudeState, CompositeController, ControlOutput};
use crate::dynamics::{RigidBodyAttitude, RigidBodyState};
use crate::error::{AicError, Result};
use crate::math::{rotation_error_angle, rotation_from_quaternion};

use super::SimConfig;

/// Simulation output for one timestep
#[derive(Debug, Clone)]
pub struct SimStep {
    /// Simulation time [s]
    pub time: f64,
    /// Plant state the controller saw
    pub state: RigidBodyState,
    pub reference: AttitudeReference,
    pub output: ControlOutput,
    /// Controller inertia estimate after the cycle
    pub inertia_estimate: Matrix3<f64>,
}

/// Simulation history
#[derive(Debug, Clone, Default)]
pub struct SimHistory {
    /// Time stamps [s]
    pub times: Vec<f64>,
    /// Geodesic attitude error [rad]
    pub attitude_errors: Vec<f64>,
    /// Applied torques [N·m]
    pub torques: Vec<Vector3<f64>>,
    pub saturated: Vec<bool>,
    pub inertia_estimates: Vec<Matrix3<f64>>,
}

impl SimHistory {
    /// Record a simulation step
    pub fn record(&mut self, step: &SimStep) {
        self.times.push(step.time);
        self.attitude_errors
            .push(rotation_error_angle(&step.state.rotation, &step.reference.rotation));
        self.torques.push(step.output.torque);
        self.saturated.push(step.output.saturated);
        self.inertia_estimates.push(step.inertia_estimate);
    }

    /// Get simulation duration
    pub fn duration(&self) -> f64 {
        match (self.times.first(), self.times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Get number of recorded steps
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Largest attitude error at or after `t_start` [rad]
    pub fn max_attitude_error_after(&self, t_start: f64) -> f64 {
        self.times
            .iter()
            .zip(&self.attitude_errors)
            .filter(|(t, _)| **t >= t_start)
            .map(|(_, e)| *e)
            .fold(0.0, f64::max)
    }

    /// Fraction of steps that hit the torque limit
    pub fn saturation_ratio(&self) -> f64 {
        if self.saturated.is_empty() {
            return 0.0;
        }
        self.saturated.iter().filter(|s| **s).count() as f64 / self.saturated.len() as f64
    }
}

/// Rigid-body attitude simulator
pub struct AttitudeSimulator {
    pub config: SimConfig,
    plant: RigidBodyAttitude,
    state: RigidBodyState,
    time: f64,
    history: SimHistory,
}

impl AttitudeSimulator {
    /// Create a new simulator from configuration
    pub fn new(config: SimConfig) -> Result<Self> {
        if !(config.dt.is_finite() && config.dt > 0.0 && config.duration >= 0.0) {
            return Err(AicError::InvalidConfig(format!(
                "simulation needs dt > 0 and duration >= 0, got dt {} duration {}",
                config.dt, config.duration
            )));
        }
        let plant = RigidBodyAttitude::new(config.true_inertia).ok_or(AicError::SingularMatrix)?;
        let state = initial_state(&config);

        Ok(Self {
            config,
            plant,
            state,
            time: 0.0,
            history: SimHistory::default(),
        })
    }

    /// Reset simulation to initial state
    pub fn reset(&mut self) {
        self.state = initial_state(&self.config);
        self.time = 0.0;
        self.history = SimHistory::default();
    }

    /// One control cycle followed by one plant step
    pub fn step(&mut self, controller: &mut CompositeController) -> SimStep {
        let reference = self.config.reference.sample(self.time);
        let measured = AttitudeState::new(self.state.rotation, self.state.angular_velocity);
        let output = controller.compute_torque(&measured, &reference, self.config.dt);

        let step = SimStep {
            time: self.time,
            state: self.state.clone(),
            reference,
            output,
            inertia_estimate: controller.inertia_estimate(),
        };
        self.history.record(&step);

        self.state = self.plant.step(&self.state, &step.output.torque, self.config.dt);
        self.time += self.config.dt;

        step
    }

    /// Run simulation for the configured duration
    pub fn run(&mut self, controller: &mut CompositeController) -> &SimHistory {
        let steps = (self.config.duration / self.config.dt).round() as usize;
        for _ in 0..steps {
            self.step(controller);
        }

        let final_error = self.history.attitude_errors.last().copied().unwrap_or_default();
        tracing::info!(
            steps,
            final_error,
            saturation_ratio = self.history.saturation_ratio(),
            "simulation finished"
        );

        &self.history
    }

    /// Get current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get current state
    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    /// Get simulation history
    pub fn history(&self) -> &SimHistory {
        &self.history
    }

    pub fn plant(&self) -> &RigidBodyAttitude {
        &self.plant
    }
}

fn initial_state(config: &SimConfig) -> RigidBodyState {
    let q = UnitQuaternion::from_scaled_axis(config.initial_state.attitude);
    RigidBodyState {
        rotation: rotation_from_quaternion(&q),
        angular_velocity: config.initial_state.angular_velocity,
    }
}
