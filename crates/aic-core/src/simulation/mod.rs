//! Closed-loop attitude simulation
//!
//! A rigid body with a fixed true inertia, a reference generator and a
//! recorder, for exercising the controller without hardware.

pub mod config;
pub mod reference;
pub mod simulator;

pub use config::*;
pub use reference::*;
pub use simulator::*;
