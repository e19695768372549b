//! Control-loop timestep handling
//!
//! The controller is rate agnostic and integrates with whatever Δt it is
//! handed. Timer jitter or wraparound can produce a huge Δt (unstable
//! integration) or a vanishing one (stalled learning), so every Δt goes
//! through [`clamp_dt`].

use serde::{Deserialize, Serialize};

/// Lower Δt bound [s] (500 Hz)
pub const DEFAULT_DT_MIN: f64 = 0.002;
/// Upper Δt bound [s] (10 Hz)
pub const DEFAULT_DT_MAX: f64 = 0.1;

/// Admissible timestep range [s]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DtBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for DtBounds {
    fn default() -> Self {
        Self { min: DEFAULT_DT_MIN, max: DEFAULT_DT_MAX }
    }
}

/// Clamp a finite Δt into `bounds`; `None` for NaN or infinite input
pub fn clamp_dt(dt: f64, bounds: &DtBounds) -> Option<f64> {
    if !dt.is_finite() {
        return None;
    }
    let clamped = dt.clamp(bounds.min, bounds.max);
    if clamped != dt {
        tracing::debug!(dt, clamped, "timestep clamped");
    }
    Some(clamped)
}

/// Derives Δt from a host's monotonic microsecond clock
///
/// The first sample only primes the timer. A timestamp that goes backwards
/// yields the lower bound.
#[derive(Debug, Clone, Default)]
pub struct LoopTimer {
    bounds: DtBounds,
    last_us: Option<u64>,
}

impl LoopTimer {
    pub fn new(bounds: DtBounds) -> Self {
        Self { bounds, last_us: None }
    }

    /// Record a sample; returns the clamped Δt since the previous one
    pub fn tick(&mut self, now_us: u64) -> Option<f64> {
        let last = self.last_us.replace(now_us)?;

        let dt = match now_us.checked_sub(last) {
            Some(elapsed) => elapsed as f64 * 1e-6,
            None => {
                tracing::warn!(now_us, last_us = last, "timestamp went backwards");
                self.bounds.min
            }
        };
        clamp_dt(dt, &self.bounds)
    }

    pub fn reset(&mut self) {
        self.last_us = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp_dt() {
        let bounds = DtBounds::default();
        assert_eq!(clamp_dt(0.01, &bounds), Some(0.01));
        assert_eq!(clamp_dt(5.0, &bounds), Some(0.1));
        assert_eq!(clamp_dt(0.0, &bounds), Some(0.002));
        assert_eq!(clamp_dt(-1.0, &bounds), Some(0.002));
        assert_eq!(clamp_dt(f64::NAN, &bounds), None);
        assert_eq!(clamp_dt(f64::INFINITY, &bounds), None);
    }

    #[test]
    fn test_timer_first_sample_primes() {
        let mut timer = LoopTimer::default();
        assert_eq!(timer.tick(1_000_000), None);

        let dt = timer.tick(1_010_000).unwrap();
        assert_relative_eq!(dt, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_timer_clamps_gaps_and_reversals() {
        let mut timer = LoopTimer::new(DtBounds::default());
        timer.tick(0);

        assert_relative_eq!(timer.tick(2_000_000).unwrap(), 0.1);
        assert_relative_eq!(timer.tick(2_000_100).unwrap(), 0.002);
        assert_relative_eq!(timer.tick(1_000_000).unwrap(), 0.002);

        timer.reset();
        assert_eq!(timer.tick(5), None);
    }
}
