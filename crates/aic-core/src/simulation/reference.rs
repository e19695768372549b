//! Attitude reference generators

use nalgebra::{Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::control::AttitudeReference;
use crate::math::rotation_from_quaternion;

/// Step used to differentiate the desired body rate [s]
const RATE_DIFF_STEP: f64 = 1e-5;

/// Desired attitude as a function of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reference {
    /// Constant attitude, given as a rotation vector [rad]
    Hold { attitude: Vector3<f64> },
    /// Roll, pitch and yaw angles (ZYX) each following A·sin(ω·t)
    Sinusoid {
        /// Amplitudes [rad]
        amplitude: Vector3<f64>,
        /// Angular frequencies [rad/s]
        frequency: Vector3<f64>,
    },
}

impl Default for Reference {
    fn default() -> Self {
        Reference::Hold { attitude: Vector3::zeros() }
    }
}

impl Reference {
    /// Desired rotation, body rate and body acceleration at time `t`
    pub fn sample(&self, t: f64) -> AttitudeReference {
        match self {
            Reference::Hold { attitude } => {
                AttitudeReference::hold(rotation_from_quaternion(&UnitQuaternion::from_scaled_axis(*attitude)))
            }
            Reference::Sinusoid { amplitude, frequency } => {
                let (angles, _) = euler_trajectory(amplitude, frequency, t);
                let rotation = *Rotation3::from_euler_angles(angles.x, angles.y, angles.z).matrix();

                let h = RATE_DIFF_STEP;
                let rate_ahead = body_rate(amplitude, frequency, t + h);
                let rate_behind = body_rate(amplitude, frequency, t - h);

                AttitudeReference::new(
                    rotation,
                    body_rate(amplitude, frequency, t),
                    (rate_ahead - rate_behind) / (2.0 * h),
                )
            }
        }
    }
}

/// Euler angles (roll, pitch, yaw) and their rates
fn euler_trajectory(amplitude: &Vector3<f64>, frequency: &Vector3<f64>, t: f64) -> (Vector3<f64>, Vector3<f64>) {
    let angles = Vector3::from_fn(|i, _| amplitude[i] * (frequency[i] * t).sin());
    let rates = Vector3::from_fn(|i, _| amplitude[i] * frequency[i] * (frequency[i] * t).cos());
    (angles, rates)
}

/// Body angular velocity of the ZYX Euler trajectory
fn body_rate(amplitude: &Vector3<f64>, frequency: &Vector3<f64>, t: f64) -> Vector3<f64> {
    let (angles, rates) = euler_trajectory(amplitude, frequency, t);
    let (sin_roll, cos_roll) = angles.x.sin_cos();
    let (sin_pitch, cos_pitch) = angles.y.sin_cos();

    Vector3::new(
        rates.x - rates.z * sin_pitch,
        rates.y * cos_roll + rates.z * cos_pitch * sin_roll,
        -rates.y * sin_roll + rates.z * cos_pitch * cos_roll,
    )
}
