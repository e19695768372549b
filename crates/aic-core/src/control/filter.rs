//! First-order IIR smoothing for the composite error

use nalgebra::Vector3;

/// First-order low-pass filter with a fixed blend coefficient
///
/// y ← α·x + (1 − α)·y. α = 1 passes the input through, α = 0 freezes
/// the output.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    /// Blend coefficient in [0, 1]
    alpha: f64,
    /// Current filtered value
    value: Vector3<f64>,
}

impl LowPassFilter {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: Vector3::zeros(),
        }
    }

    /// Update filter with new measurement
    pub fn update(&mut self, measurement: &Vector3<f64>) -> Vector3<f64> {
        self.value = measurement * self.alpha + self.value * (1.0 - self.alpha);
        self.value
    }

    /// Get current filtered value
    pub fn value(&self) -> Vector3<f64> {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Change the coefficient, clamped to [0, 1]; the state is kept
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Reset filter state
    pub fn reset(&mut self, value: Vector3<f64>) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_response() {
        let mut filter = LowPassFilter::new(0.1);
        let input = Vector3::new(1.0, -2.0, 0.0);

        let first = filter.update(&input);
        assert_relative_eq!(first, input * 0.1, epsilon = 1e-15);

        for _ in 0..200 {
            filter.update(&input);
        }
        assert_relative_eq!(filter.value(), input, epsilon = 1e-8);
    }

    #[test]
    fn test_coefficient_is_clamped() {
        let mut filter = LowPassFilter::new(3.0);
        assert_relative_eq!(filter.alpha(), 1.0);

        filter.set_alpha(-1.0);
        assert_relative_eq!(filter.alpha(), 0.0);

        // α = 0 holds the previous output
        filter.reset(Vector3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(filter.update(&Vector3::zeros()), Vector3::new(0.5, 0.5, 0.5));
    }
}
