//! Single-pole DC blocker.
//!
//! Removes the slowly drifting offset that windowing and resampling leave
//! behind:
//!
//!   y[n] = x[n] - x[n-1] + R * y[n-1]
//!
//! A zero at DC and a pole just inside the unit circle at `R`. The closer `R`
//! is to 1.0 the lower the corner frequency (≈ 35 Hz at 44.1 kHz for 0.995).

pub const DEFAULT_COEFFICIENT: f32 = 0.995;

#[derive(Debug, Clone, Copy)]
pub struct DcBlocker {
    coefficient: f32,
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::with_coefficient(DEFAULT_COEFFICIENT)
    }

    pub fn with_coefficient(coefficient: f32) -> Self {
        Self {
            coefficient: coefficient.clamp(0.0, 0.9999),
            x1: 0.0,
            y1: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = input - self.x1 + self.coefficient * self.y1;
        self.x1 = input;
        self.y1 = output;
        output
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::new()
    }
}
