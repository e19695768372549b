//! Online inertia estimation
//!
//! Two adaptation laws share one contract, [`InertiaEstimator`]:
//! - [`GradientEstimator`]: gradient descent with σ-modification and projection
//! - [`IwgEstimator`]: information-weighted gradient with excitation handling,
//!   preferred under actuator saturation or sparse excitation
//!
//! [`Estimator`] is the tagged variant the controller holds.

pub mod config;
pub mod model;
pub mod projection;
pub mod state;
pub mod gradient;
pub mod iwg;

pub use config::*;
pub use model::*;
pub use projection::*;
pub use state::EstimatorState;
pub use gradient::GradientEstimator;
pub use iwg::IwgEstimator;

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::dynamics::Regressor;

/// Common contract of the adaptation laws
///
/// Single writer: `update` mutates θ and P and must not race with readers.
pub trait InertiaEstimator {
    /// Parameterization being learned
    fn model(&self) -> InertiaModel;

    /// One adaptation step driven by regressor `Y` and composite error `s`
    ///
    /// After every call the reconstructed inertia is symmetric with its
    /// diagonal inside [J_min, J_max]. Inputs that are non-finite, have the
    /// wrong layout or a non-positive `dt` leave the state untouched.
    fn update(&mut self, regressor: &Regressor, s: &Vector3<f64>, dt: f64);

    fn state(&self) -> &EstimatorState;

    fn config(&self) -> &EstimatorConfig;

    fn set_config(&mut self, config: EstimatorConfig);

    /// Restart from a new initial guess; P returns to its seed
    fn reset(&mut self, inertia_init: &Matrix3<f64>);

    fn theta(&self) -> &DVector<f64> {
        self.state().theta()
    }

    fn inertia_estimate(&self) -> Matrix3<f64> {
        self.state().inertia_estimate()
    }

    fn information_matrix(&self) -> &DMatrix<f64> {
        self.state().information()
    }

    fn information_determinant(&self) -> f64 {
        self.state().information_determinant()
    }

    /// Advisory: |det P| above the excitation threshold
    fn is_persistently_excited(&self) -> bool {
        self.information_determinant().abs() > self.config().excitation_threshold
    }
}

/// Adaptation law selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstimatorKind {
    Gradient,
    #[default]
    InformationWeighted,
}

/// The estimator owned by a controller
#[derive(Debug, Clone)]
pub enum Estimator {
    Gradient(GradientEstimator),
    InformationWeighted(IwgEstimator),
}

impl Estimator {
    pub fn new(
        kind: EstimatorKind,
        model: InertiaModel,
        inertia_init: &Matrix3<f64>,
        config: EstimatorConfig,
    ) -> Self {
        match kind {
            EstimatorKind::Gradient => Estimator::Gradient(GradientEstimator::new(model, inertia_init, config)),
            EstimatorKind::InformationWeighted => {
                Estimator::InformationWeighted(IwgEstimator::new(model, inertia_init, config))
            }
        }
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::Gradient(_) => EstimatorKind::Gradient,
            Estimator::InformationWeighted(_) => EstimatorKind::InformationWeighted,
        }
    }

    fn inner(&self) -> &dyn InertiaEstimator {
        match self {
            Estimator::Gradient(e) => e,
            Estimator::InformationWeighted(e) => e,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn InertiaEstimator {
        match self {
            Estimator::Gradient(e) => e,
            Estimator::InformationWeighted(e) => e,
        }
    }
}

impl InertiaEstimator for Estimator {
    fn model(&self) -> InertiaModel {
        self.inner().model()
    }

    fn update(&mut self, regressor: &Regressor, s: &Vector3<f64>, dt: f64) {
        self.inner_mut().update(regressor, s, dt);
    }

    fn state(&self) -> &EstimatorState {
        self.inner().state()
    }

    fn config(&self) -> &EstimatorConfig {
        self.inner().config()
    }

    fn set_config(&mut self, config: EstimatorConfig) {
        self.inner_mut().set_config(config);
    }

    fn reset(&mut self, inertia_init: &Matrix3<f64>) {
        self.inner_mut().reset(inertia_init);
    }
}
