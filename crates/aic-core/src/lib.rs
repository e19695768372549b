//! # AIC Core
//!
//! Adaptive Inertia-aware Composite (AIC) attitude control
//!
//! A geometric PD attitude controller on SO(3) augmented with an adaptive
//! feedforward term that learns the vehicle's inertia tensor online, plus a
//! robust damping term on a filtered composite error. Inertia learning uses
//! either a plain gradient law or the information-weighted gradient (IWG),
//! which stays well behaved under actuator saturation and sparse excitation.
//!
//! ## Modules
//!
//! - [`math`]: SO(3) geometry, small-matrix inversion, attitude integration
//! - [`dynamics`]: torque regressor and rigid-body rotational dynamics
//! - [`estimation`]: online inertia estimators (gradient, IWG)
//! - [`control`]: the composite controller and its configuration
//! - [`simulation`]: closed-loop rigid-body simulation harness
//!
//! ## Example
//!
//! ```
//! use aic_core::control::{default_inertia, AttitudeReference, AttitudeState, CompositeController};
//!
//! let mut controller = CompositeController::with_defaults(&default_inertia())?;
//! let output = controller.compute_torque(&AttitudeState::default(), &AttitudeReference::default(), 0.01);
//! assert_eq!(output.torque, aic_core::Vec3::zeros());
//! # Ok::<(), aic_core::AicError>(())
//! ```

pub mod error;
pub mod math;
pub mod dynamics;
pub mod estimation;
pub mod control;
pub mod simulation;

pub use error::{AicError, Result};

// Common type aliases
use nalgebra::{Matrix3, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f64>;
