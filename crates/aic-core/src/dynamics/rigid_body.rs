//! Rigid-body rotational dynamics
//!
//! Two conventions live here and must not be mixed up:
//!
//! - [`rigid_body_torque`] is the torque model the controller is built on,
//!   τ = Jα − Ω × (JΩ). The regressor reproduces it exactly.
//! - [`RigidBodyAttitude`] is the physical plant used by the simulator,
//!   Jω̇ = τ − ω × Jω (Euler's equation).

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::{integrate_rotation, rk4_vec3};

/// Torque model linear in the inertia parameters
///
/// τ = J α − Ω × (J Ω)
pub fn rigid_body_torque(j: &Matrix3<f64>, omega: &Vector3<f64>, alpha: &Vector3<f64>) -> Vector3<f64> {
    j * alpha - omega.cross(&(j * omega))
}

/// Attitude state of a rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Orientation (body to world)
    pub rotation: Matrix3<f64>,
    /// Angular velocity [rad/s] (body frame)
    pub angular_velocity: Vector3<f64>,
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self {
            rotation: Matrix3::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

/// Rotational plant with a fixed, known inertia
#[derive(Debug, Clone)]
pub struct RigidBodyAttitude {
    /// Inertia tensor [kg·m²] (body frame)
    inertia: Matrix3<f64>,
    /// Inverse inertia tensor
    inertia_inv: Matrix3<f64>,
}

impl RigidBodyAttitude {
    /// Create a plant; `None` if the inertia is not invertible
    pub fn new(inertia: Matrix3<f64>) -> Option<Self> {
        let inertia_inv = inertia.try_inverse()?;
        Some(Self { inertia, inertia_inv })
    }

    pub fn inertia(&self) -> &Matrix3<f64> {
        &self.inertia
    }

    /// ω̇ = J⁻¹(τ − ω × Jω)
    pub fn angular_acceleration(&self, omega: &Vector3<f64>, torque: &Vector3<f64>) -> Vector3<f64> {
        let gyro = omega.cross(&(self.inertia * omega));
        self.inertia_inv * (torque - gyro)
    }

    /// Advance the state by `dt` under a constant torque
    pub fn step(&self, state: &RigidBodyState, torque: &Vector3<f64>, dt: f64) -> RigidBodyState {
        let omega_next = rk4_vec3(&state.angular_velocity, 0.0, dt, |_, w| {
            self.angular_acceleration(w, torque)
        });

        // Midpoint rate for the attitude update
        let omega_mid = 0.5 * (state.angular_velocity + omega_next);

        RigidBodyState {
            rotation: integrate_rotation(&state.rotation, &omega_mid, dt),
            angular_velocity: omega_next,
        }
    }
}
