//! Small dense linear algebra helpers
//!
//! Inversion of the n×n weighting matrices used by the estimators
//! (n = 3 or 6). Inversion is fallible; the regularized variant always
//! produces a usable matrix so that nothing propagates into the control loop.

use nalgebra::DMatrix;

use crate::error::{AicError, Result};

/// Determinant magnitude below which a matrix is treated as singular
pub const SINGULARITY_THRESHOLD: f64 = 1e-12;

/// Invert a square matrix, failing on numerical singularity
pub fn try_invert(m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if !m.is_square() || m.determinant().abs() < SINGULARITY_THRESHOLD {
        return Err(AicError::SingularMatrix);
    }

    let inv = m.clone().try_inverse().ok_or(AicError::SingularMatrix)?;

    if inv.iter().all(|v| v.is_finite()) {
        Ok(inv)
    } else {
        Err(AicError::SingularMatrix)
    }
}

/// Invert `m`, retrying with `m + εI` (ε growing tenfold) when singular
///
/// Falls back to the identity if regularization never succeeds, which
/// reduces the information-weighted update to a plain gradient step.
pub fn regularized_inverse(m: &DMatrix<f64>, epsilon: f64) -> DMatrix<f64> {
    let n = m.nrows();

    match try_invert(m) {
        Ok(inv) => inv,
        Err(_) => {
            let mut eps = epsilon.max(f64::EPSILON);
            for _ in 0..6 {
                let shifted = m + DMatrix::identity(n, n) * eps;
                if let Ok(inv) = try_invert(&shifted) {
                    tracing::debug!(epsilon = eps, "weighting matrix regularized before inversion");
                    return inv;
                }
                eps *= 10.0;
            }
            tracing::warn!("regularization failed, falling back to identity weighting");
            DMatrix::identity(n, n)
        }
    }
}

/// Symmetrize in place: M ← (M + Mᵀ)/2
pub fn symmetrize(m: &mut DMatrix<f64>) {
    let sym = (&*m + m.transpose()) * 0.5;
    *m = sym;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invert_well_conditioned() {
        let m = DMatrix::from_row_slice(3, 3, &[
            2.0, 0.5, 0.0,
            0.5, 3.0, 0.1,
            0.0, 0.1, 1.0,
        ]);
        let inv = try_invert(&m).unwrap();
        assert_relative_eq!(&m * &inv, DMatrix::identity(3, 3), epsilon = 1e-12);
    }

    #[test]
    fn test_invert_six_by_six() {
        let mut m = DMatrix::identity(6, 6) * 2.0;
        m[(0, 5)] = 0.3;
        m[(5, 0)] = 0.3;
        let inv = try_invert(&m).unwrap();
        assert_relative_eq!(&inv * &m, DMatrix::identity(6, 6), epsilon = 1e-12);
    }

    #[test]
    fn test_singular_is_an_error() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(try_invert(&m), Err(AicError::SingularMatrix));
    }

    #[test]
    fn test_regularized_inverse_recovers() {
        let m = DMatrix::zeros(3, 3);
        let inv = regularized_inverse(&m, 1e-6);

        assert!(inv.iter().all(|v| v.is_finite()));
        assert!(inv[(0, 0)] > 0.0);
    }

    #[test]
    fn test_symmetrize() {
        let mut m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 4.0, 3.0]);
        symmetrize(&mut m);
        assert_relative_eq!(m[(0, 1)], 3.0);
        assert_relative_eq!(m[(1, 0)], 3.0);
    }
}
