//! Output peak limiter.
//!
//! An attack/release envelope follower over |x|. The gain is taken from the
//! larger of the envelope and the current |x|: while that sits above the
//! threshold the signal is scaled by `threshold / peak`, otherwise it passes
//! at unity gain. No output sample exceeds the threshold; the release still
//! follows the envelope.
//!
//! Coefficients are one-pole smoothing factors:
//!
//!   coeff = exp(-1 / (time_seconds * sample_rate))
//!
//! so the envelope covers ~63% of a step in `time_seconds`.

pub const DEFAULT_THRESHOLD: f32 = 0.95;
pub const DEFAULT_ATTACK: f32 = 0.001;
pub const DEFAULT_RELEASE: f32 = 0.100;

#[derive(Debug, Clone, Copy)]
pub struct PeakLimiter {
    threshold: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

#[inline]
fn smoothing_coefficient(time_seconds: f32, sample_rate: f32) -> f32 {
    (-1.0 / (time_seconds.max(1e-6) * sample_rate.max(1.0))).exp()
}

impl PeakLimiter {
    pub fn new(threshold: f32) -> Self {
        let mut limiter = Self {
            threshold: threshold.clamp(0.01, 1.0),
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
        };
        limiter.prepare(44_100.0);
        limiter
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.attack_coeff = smoothing_coefficient(DEFAULT_ATTACK, sample_rate);
        self.release_coeff = smoothing_coefficient(DEFAULT_RELEASE, sample_rate);
        self.envelope = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let magnitude = input.abs();
        let coeff = if magnitude > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * (self.envelope - magnitude) + magnitude;

        let peak = self.envelope.max(magnitude);
        let gain = if peak > self.threshold {
            self.threshold / peak
        } else {
            1.0
        };
        input * gain
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn envelope(&self) -> f32 {
        self.envelope
    }
}

impl Default for PeakLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
