//! Soft clipping
//!
//! The last nonlinear stage of a voice. Overlapping grains can sum above full
//! scale for a few samples; a tanh waveshaper folds those transients into a
//! gentle knee instead of the harsh corner of a hard clip.
//!
//! # Transfer function
//!
//!   output = tanh(input * drive)
//!
//!   drive < 1.0   headroom, only large peaks bend
//!   drive = 1.0   unity slope at the origin
//!   drive > 1.0   audible saturation
//!
//! # Oversampling
//!
//! Any waveshaper creates harmonics, and harmonics above Nyquist alias. With
//! oversampling enabled the clipper linearly interpolates OVERSAMPLE points
//! between the previous and the current input, shapes them at the higher
//! rate, low-passes the result just under the base Nyquist and keeps every
//! OVERSAMPLE-th filtered point.

use crate::dsp::filter::ButterworthLowPass;

pub const OVERSAMPLE: usize = 4;

/// Stateless tanh soft clip.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    (sample * drive).tanh()
}

/// Apply soft clipping to an entire buffer in place.
pub fn soft_clip_buffer(buffer: &mut [f32], drive: f32) {
    for sample in buffer.iter_mut() {
        *sample = soft_clip(*sample, drive);
    }
}

#[derive(Debug, Clone)]
pub struct SoftClipper {
    drive: f32,
    oversample: bool,
    previous_input: f32,
    filter: ButterworthLowPass,
}

impl SoftClipper {
    pub fn new(drive: f32, oversample: bool) -> Self {
        Self {
            drive: drive.max(0.01),
            oversample,
            previous_input: 0.0,
            filter: ButterworthLowPass::new(),
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.filter.prepare(sample_rate * OVERSAMPLE as f32);
        self.filter.set_cutoff(sample_rate * 0.45);
        self.reset();
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if !self.oversample {
            return soft_clip(input, self.drive);
        }

        let start = self.previous_input;
        let step = (input - start) / OVERSAMPLE as f32;
        let mut output = 0.0;
        for k in 1..=OVERSAMPLE {
            let x = start + step * k as f32;
            output = self.filter.process(soft_clip(x, self.drive));
        }
        self.previous_input = input;
        output
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.previous_input = 0.0;
        self.filter.reset();
    }
}

impl Default for SoftClipper {
    fn default() -> Self {
        Self::new(1.0, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn hot_sine(len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|n| amplitude * (TAU * 220.0 * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    #[test]
    fn small_signals_pass_nearly_linear() {
        let output = soft_clip(0.01, 1.0);
        assert!((output - 0.01).abs() < 1e-5);
    }

    #[test]
    fn large_signals_saturate_below_one() {
        let output = soft_clip(10.0, 1.0);
        assert!(output > 0.99 && output <= 1.0);
        assert!(soft_clip(-10.0, 1.0) < -0.99);
    }

    #[test]
    fn plain_clipper_never_exceeds_unity() {
        let mut clipper = SoftClipper::new(0.8, false);
        clipper.prepare(SAMPLE_RATE);
        let mut buffer = hot_sine(2048, 8.0);
        clipper.render(&mut buffer);
        assert!(buffer.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn oversampled_clipper_tracks_plain_clipper_on_quiet_input() {
        let mut clipper = SoftClipper::new(1.0, true);
        clipper.prepare(SAMPLE_RATE);
        let mut buffer = vec![0.2; 2048];
        clipper.render(&mut buffer);
        let expected = soft_clip(0.2, 1.0);
        assert!((buffer[2047] - expected).abs() < 1e-3, "got {}", buffer[2047]);
    }

    #[test]
    fn oversampled_clipper_keeps_hot_input_bounded() {
        let mut clipper = SoftClipper::new(1.0, true);
        clipper.prepare(SAMPLE_RATE);
        let mut buffer = hot_sine(4096, 10.0);
        clipper.render(&mut buffer);
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak < 1.15, "peak after clipping: {}", peak);
    }
}
