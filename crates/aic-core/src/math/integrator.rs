//! Numerical integration for rigid-body attitude
//!
//! RK4 for the body rates and the exponential map for the attitude, so the
//! simulated rotation never leaves SO(3).

use nalgebra::{Matrix3, Rotation3, Vector3};

/// RK4 integrator for Vector3
///
/// Solves dx/dt = f(t, x) using 4th-order Runge-Kutta method.
pub fn rk4_vec3<F>(
    x: &Vector3<f64>,
    t: f64,
    dt: f64,
    f: F,
) -> Vector3<f64>
where
    F: Fn(f64, &Vector3<f64>) -> Vector3<f64>,
{
    let k1 = f(t, x);
    let k2 = f(t + dt / 2.0, &(x + k1 * dt / 2.0));
    let k3 = f(t + dt / 2.0, &(x + k2 * dt / 2.0));
    let k4 = f(t + dt, &(x + k3 * dt));

    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Propagate a body-to-world rotation under constant body rate
///
/// R(t + dt) = R(t) · exp(ω^ dt)
pub fn integrate_rotation(r: &Matrix3<f64>, omega: &Vector3<f64>, dt: f64) -> Matrix3<f64> {
    let delta = Rotation3::new(omega * dt);
    let next = r * delta.matrix();

    // Re-orthonormalize starting from the propagated matrix itself
    let rot = Rotation3::from_matrix_eps(&next, 1e-12, 20, Rotation3::from_matrix_unchecked(next));
    *rot.matrix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use crate::math::so3::{axis_angle_rotation, is_valid_rotation, ROTATION_TOLERANCE};

    #[test]
    fn test_rk4_vec3_projectile() {
        let g = Vector3::new(0.0, 0.0, -9.81);
        let v0 = Vector3::new(1.0, 0.0, 5.0);

        let v = rk4_vec3(&v0, 0.0, 0.5, |_, _| g);

        assert_relative_eq!(v, v0 + g * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rk4_exponential_decay() {
        let mut x = Vector3::new(1.0, 2.0, 3.0);
        let dt = 0.01;
        for i in 0..100 {
            x = rk4_vec3(&x, i as f64 * dt, dt, |_, x| -x);
        }

        let decay = (-1.0f64).exp();
        assert_relative_eq!(x, Vector3::new(1.0, 2.0, 3.0) * decay, epsilon = 1e-8);
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let omega = Vector3::new(0.0, 0.0, PI / 2.0);
        let mut r = Matrix3::identity();
        for _ in 0..100 {
            r = integrate_rotation(&r, &omega, 0.01);
        }

        // 90° about z maps x onto y
        assert_relative_eq!(r * Vector3::x(), Vector3::y(), epsilon = 1e-9);
        assert!(is_valid_rotation(&r, ROTATION_TOLERANCE));
    }

    #[test]
    fn test_zero_rate_keeps_large_rotations() {
        let axis = Vector3::new(1.0, -2.0, 0.5).normalize();
        for angle in [2.5, 3.0, 3.1] {
            let r0 = axis_angle_rotation(&axis, angle);
            let mut r = r0;
            for _ in 0..50 {
                r = integrate_rotation(&r, &Vector3::zeros(), 0.01);
            }

            assert_relative_eq!(r, r0, epsilon = 1e-12);
            assert!(is_valid_rotation(&r, ROTATION_TOLERANCE));
        }
    }

    #[test]
    fn test_rotation_half_turn_from_offset() {
        let r0 = axis_angle_rotation(&Vector3::z(), 2.0);
        let omega = Vector3::new(0.0, 0.0, 1.0);
        let mut r = r0;
        for _ in 0..100 {
            r = integrate_rotation(&r, &omega, 0.01);
        }

        assert_relative_eq!(r, axis_angle_rotation(&Vector3::z(), 3.0), epsilon = 1e-9);
    }
}
