//! Projection of θ onto physically valid inertia
//!
//! An unconstrained gradient step can leave the estimate non-symmetric,
//! indefinite or outside [J_min, J_max]. Every estimator update ends with one
//! of these projections.
//!
//! [`ProjectionMethod::Gershgorin`] clips the diagonal and bounds each coupling
//! term by `0.3·Jii·Jjj`, which keeps the tensor diagonally dominant. It is a
//! surrogate for the SPD constraint, not an exact projection; eigenvalues of a
//! coupled estimate may sit slightly outside [J_min, J_max].
//!
//! [`ProjectionMethod::EigenClip`] decomposes the tensor, clips its
//! eigenvalues and recomposes it.

use nalgebra::{DVector, Matrix3};
use serde::{Deserialize, Serialize};

use super::config::EstimatorBounds;
use super::model::InertiaModel;

/// Off-diagonal bound factor for the Gershgorin-style clamp
pub const COUPLING_FACTOR: f64 = 0.3;

/// Projection used for the full symmetric model
///
/// Both methods reduce to per-element clipping for the diagonal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMethod {
    #[default]
    Gershgorin,
    EigenClip,
}

/// Project θ in place
pub fn project(
    model: InertiaModel,
    theta: &mut DVector<f64>,
    bounds: &EstimatorBounds,
    method: ProjectionMethod,
) {
    match model {
        InertiaModel::Diagonal => {
            theta.apply(|v| *v = bounds.clamp(*v));
        }
        InertiaModel::Full => {
            let j = model.inertia_from_theta(theta);
            let projected = match method {
                ProjectionMethod::Gershgorin => gershgorin_clamp(&j, bounds),
                ProjectionMethod::EigenClip => eigen_clip(&j, bounds),
            };
            *theta = model.theta_from_inertia(&projected);
        }
    }
}

fn gershgorin_clamp(j: &Matrix3<f64>, bounds: &EstimatorBounds) -> Matrix3<f64> {
    let mut out = 0.5 * (j + j.transpose());

    for i in 0..3 {
        out[(i, i)] = bounds.clamp(out[(i, i)]);
    }

    for (a, b) in [(0, 1), (0, 2), (1, 2)] {
        let limit = COUPLING_FACTOR * out[(a, a)] * out[(b, b)];
        let coupling = out[(a, b)].clamp(-limit, limit);
        out[(a, b)] = coupling;
        out[(b, a)] = coupling;
    }

    out
}

fn eigen_clip(j: &Matrix3<f64>, bounds: &EstimatorBounds) -> Matrix3<f64> {
    let sym = 0.5 * (j + j.transpose());
    let mut eig = sym.symmetric_eigen();
    eig.eigenvalues.apply(|v| *v = bounds.clamp(*v));

    let recomposed = eig.recompose();
    0.5 * (recomposed + recomposed.transpose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_theta(values: [f64; 6]) -> DVector<f64> {
        DVector::from_vec(values.to_vec())
    }

    #[test]
    fn test_diagonal_clipping() {
        let mut theta = DVector::from_vec(vec![-0.5, 0.05, 3.0]);
        project(InertiaModel::Diagonal, &mut theta, &EstimatorBounds::default(), ProjectionMethod::Gershgorin);

        assert_relative_eq!(theta[0], 0.01);
        assert_relative_eq!(theta[1], 0.05);
        assert_relative_eq!(theta[2], 1.0);
    }

    #[test]
    fn test_interior_point_is_fixed() {
        let original = full_theta([0.05, 0.05, 0.03, 1e-4, -2e-4, 1e-4]);
        let mut theta = original.clone();
        project(InertiaModel::Full, &mut theta, &EstimatorBounds::default(), ProjectionMethod::Gershgorin);

        assert_relative_eq!(theta, original, epsilon = 1e-15);
    }

    #[test]
    fn test_gershgorin_bounds_all_couplings() {
        let mut theta = full_theta([0.5, 0.4, 0.2, 1.0, -1.0, 1.0]);
        project(InertiaModel::Full, &mut theta, &EstimatorBounds::default(), ProjectionMethod::Gershgorin);

        assert_relative_eq!(theta[3], 0.3 * 0.5 * 0.4, epsilon = 1e-15);
        assert_relative_eq!(theta[4], -0.3 * 0.5 * 0.2, epsilon = 1e-15);
        assert_relative_eq!(theta[5], 0.3 * 0.4 * 0.2, epsilon = 1e-15);

        let j = InertiaModel::Full.inertia_from_theta(&theta);
        assert!(j.cholesky().is_some());
    }

    #[test]
    fn test_eigen_clip_bounds_spectrum() {
        let bounds = EstimatorBounds::default();
        let mut theta = full_theta([0.02, 0.02, 2.0, 0.05, 0.0, 0.0]);
        project(InertiaModel::Full, &mut theta, &bounds, ProjectionMethod::EigenClip);

        let eig = InertiaModel::Full.inertia_from_theta(&theta).symmetric_eigenvalues();
        for v in eig.iter() {
            assert!(*v >= bounds.j_min - 1e-12 && *v <= bounds.j_max + 1e-12, "eigenvalue {v}");
        }
    }
}
