//! Simulation configuration

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::reference::Reference;

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Control and integration step [s]
    pub dt: f64,
    /// Total simulation duration [s]
    pub duration: f64,
    /// Inertia of the simulated body [kg·m²], unknown to the controller
    pub true_inertia: Matrix3<f64>,
    pub initial_state: InitialStateConfig,
    pub reference: Reference,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.01, // 100 Hz control loop
            duration: 10.0,
            true_inertia: Matrix3::from_diagonal(&Vector3::new(0.05, 0.05, 0.03)),
            initial_state: InitialStateConfig::default(),
            reference: Reference::default(),
        }
    }
}

/// Initial attitude configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialStateConfig {
    /// Initial attitude as a rotation vector (axis · angle) [rad]
    pub attitude: Vector3<f64>,
    /// Initial body angular velocity [rad/s]
    pub angular_velocity: Vector3<f64>,
}
