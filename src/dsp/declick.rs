//! Sample-jump smoothing.
//!
//! Runs last in a voice chain. When the output moves by more than
//! `threshold` between two consecutive samples, only half of the jump is
//! taken and the rest is picked up on following samples:
//!
//!   |x[n] - y[n-1]| > threshold  →  y[n] = y[n-1] + (x[n] - y[n-1]) / 2
//!   otherwise                    →  y[n] = x[n]

pub const DEFAULT_JUMP_THRESHOLD: f32 = 0.3;

/// Stateless form, for callers that keep the previous output themselves.
#[inline]
pub fn declick(sample: f32, previous: f32, threshold: f32) -> f32 {
    if (sample - previous).abs() > threshold {
        previous + (sample - previous) * 0.5
    } else {
        sample
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Declicker {
    threshold: f32,
    last_output: f32,
}

impl Declicker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            last_output: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = declick(input, self.last_output, self.threshold);
        self.last_output = output;
        output
    }

    pub fn reset(&mut self) {
        self.last_output = 0.0;
    }
}

impl Default for Declicker {
    fn default() -> Self {
        Self::new(DEFAULT_JUMP_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_steps_pass_unchanged() {
        let mut declicker = Declicker::default();
        for x in [0.1, 0.3, 0.5, 0.25, -0.04] {
            assert_eq!(declicker.process(x), x);
        }
    }

    #[test]
    fn large_jump_is_halved() {
        let mut declicker = Declicker::default();
        declicker.process(0.1);
        let out = declicker.process(0.9);
        assert!((out - 0.5).abs() < 1e-6, "got {}", out);
    }

    #[test]
    fn step_settles_on_target() {
        let mut declicker = Declicker::default();
        let mut out = 0.0;
        let mut previous = 0.0f32;
        for _ in 0..8 {
            out = declicker.process(1.0);
            assert!((out - previous).abs() <= 0.5 + 1e-6);
            previous = out;
        }
        assert_eq!(out, 1.0);
    }

    #[test]
    fn reset_forgets_history() {
        let mut declicker = Declicker::default();
        declicker.process(0.2);
        declicker.reset();
        assert!((declicker.process(0.8) - 0.4).abs() < 1e-6);
    }
}
