//! Rigid-body rotational dynamics
//!
//! - [`regressor`]: torque regressor Y(Ω, α), linear in the inertia parameters
//! - [`rigid_body`]: torque model and the simulated attitude plant

pub mod regressor;
pub mod rigid_body;

pub use regressor::*;
pub use rigid_body::*;
