//! Attitude control
//!
//! - [`composite`]: the adaptive composite controller, one call per control tick
//! - [`config`]: gains, saturation, filter and timestep configuration
//! - [`filter`]: composite error smoothing
//! - [`timing`]: Δt clamping and host clock handling

pub mod config;
pub mod filter;
pub mod timing;
pub mod composite;

pub use config::*;
pub use filter::*;
pub use timing::*;
pub use composite::*;
