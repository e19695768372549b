//! SO(3) geometry for geometric attitude control
//!
//! Hat/vee maps, tracking errors on SO(3) and the body-frame commanded
//! angular acceleration. Everything here is a pure function of its inputs.
//!
//! Error definitions follow Lee et al., "Geometric Tracking Control of a
//! Quadrotor UAV on SE(3)".

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::error::{AicError, Result};

/// Default tolerance for [`is_valid_rotation`]
pub const ROTATION_TOLERANCE: f64 = 1e-4;

/// Skew-symmetric matrix from vector (hat operator)
///
/// For v = [x, y, z]^T:
/// ```text
/// v^ = [ 0  -z   y]
///      [ z   0  -x]
///      [-y   x   0]
/// ```
pub fn hat(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Vector from skew-symmetric matrix (vee operator)
///
/// Left inverse of [`hat`]. Reads the lower-left/upper-right entries
/// `(M₂₁, M₀₂, M₁₀)`; the other half of a non-skew input is ignored.
pub fn vee(m: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// Attitude error on SO(3)
///
/// e_R = ½ vee(R_dᵀR − RᵀR_d)
///
/// Zero iff R = R_d, except at the 180° antipodal set where the metric
/// is also flat.
pub fn attitude_error(r: &Matrix3<f64>, r_d: &Matrix3<f64>) -> Vector3<f64> {
    let r_err = r_d.transpose() * r;
    0.5 * vee(&(r_err - r_err.transpose()))
}

/// Angular velocity error
///
/// e_Ω = Ω − RᵀR_d Ω_d
pub fn angular_velocity_error(
    omega: &Vector3<f64>,
    r: &Matrix3<f64>,
    r_d: &Matrix3<f64>,
    omega_d: &Vector3<f64>,
) -> Vector3<f64> {
    omega - r.transpose() * r_d * omega_d
}

/// Body-frame commanded angular acceleration
///
/// α = E α_d − Ω^ E Ω_d, with E = RᵀR_d
///
/// This is the acceleration the regressor assumes when computing the
/// feedforward torque.
pub fn commanded_angular_accel(
    r: &Matrix3<f64>,
    r_d: &Matrix3<f64>,
    omega: &Vector3<f64>,
    omega_d: &Vector3<f64>,
    alpha_d: &Vector3<f64>,
) -> Vector3<f64> {
    let e = r.transpose() * r_d;
    e * alpha_d - hat(omega) * e * omega_d
}

/// Trace-based attitude error Ψ = (3 − tr(RᵀR_d)) / 2
///
/// Lyapunov candidate, used for monitoring and tests only. Ranges over
/// [0, 2]; 2 at a 180° error.
pub fn trace_attitude_error(r: &Matrix3<f64>, r_d: &Matrix3<f64>) -> f64 {
    (3.0 - (r.transpose() * r_d).trace()) / 2.0
}

/// Rate of the trace error, Ψ̇ = e_R · e_Ω
pub fn trace_attitude_error_rate(e_r: &Vector3<f64>, e_omega: &Vector3<f64>) -> f64 {
    e_r.dot(e_omega)
}

/// Geodesic distance between two attitudes [rad]
pub fn rotation_error_angle(r: &Matrix3<f64>, r_d: &Matrix3<f64>) -> f64 {
    let cos_angle = (((r_d.transpose() * r).trace() - 1.0) / 2.0).clamp(-1.0, 1.0);
    cos_angle.acos()
}

/// Rotation matrix (body to world) from a unit quaternion
pub fn rotation_from_quaternion(q: &UnitQuaternion<f64>) -> Matrix3<f64> {
    *q.to_rotation_matrix().matrix()
}

/// Rotation of `angle` radians about a body axis, as a matrix
pub fn axis_angle_rotation(axis: &Vector3<f64>, angle: f64) -> Matrix3<f64> {
    let q = UnitQuaternion::from_scaled_axis(axis.normalize() * angle);
    rotation_from_quaternion(&q)
}

/// Check ‖RᵀR − I‖ < tol and |det R − 1| < tol
pub fn is_valid_rotation(r: &Matrix3<f64>, tol: f64) -> bool {
    check_rotation(r, tol).is_ok()
}

/// Same test as [`is_valid_rotation`], reporting how far off the matrix is
pub fn check_rotation(r: &Matrix3<f64>, tol: f64) -> Result<()> {
    let orthogonality = (r.transpose() * r - Matrix3::identity()).norm();
    let determinant = r.determinant();

    if orthogonality < tol && (determinant - 1.0).abs() < tol {
        Ok(())
    } else {
        Err(AicError::InvalidRotation { orthogonality, determinant })
    }
}
