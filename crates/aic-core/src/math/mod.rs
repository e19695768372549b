//! Mathematical utilities for the AIC controller
//!
//! SO(3) geometry, small-matrix inversion and attitude integration.

pub mod so3;
pub mod linalg;
pub mod integrator;

pub use so3::*;
pub use linalg::*;
pub use integrator::*;
