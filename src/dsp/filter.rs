use std::f32::consts::TAU;

/*
4th-Order Butterworth Low-Pass
==============================

Used as the anti-aliasing stage of every voice: when a grain reads the source
faster than real time (pitch up), content above the new Nyquist folds back as
inharmonic noise. Low-passing at 20 kHz / pitch_ratio suppresses it.

A 4th-order Butterworth is two 2nd-order sections (biquads) in series. Each
section is a standard RBJ low-pass; the Butterworth response comes from the Q
of each stage, which are the pole angles of the 4th-order prototype:

    Q1 = 1 / (2 cos(π/8))   ≈ 0.5412
    Q2 = 1 / (2 cos(3π/8))  ≈ 1.3066

  gain
   1.0 ──────────────╮
                      ╲   -24 dB/octave
                       ╲
   0.0 ─────────────────╲────→ freq
                    cutoff

Cutoff is clamped to [MIN_CUTOFF_HZ, MAX_CUTOFF_HZ] and kept below 0.49 of the
sample rate, so a bad request degrades to the nearest stable filter instead of
blowing up.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

const STAGE_Q: [f32; 2] = [0.541_196_1, 1.306_563];

/// Direct form I biquad section.
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
        x1: 0.0,
        x2: 0.0,
        y1: 0.0,
        y2: 0.0,
    };

    fn set_lowpass(&mut self, cutoff_hz: f32, q: f32, sample_rate: f32) {
        let omega = TAU * cutoff_hz / sample_rate;
        let (sin, cos) = omega.sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;

        self.b0 = (1.0 - cos) / (2.0 * a0);
        self.b1 = (1.0 - cos) / a0;
        self.b2 = self.b0;
        self.a1 = (-2.0 * cos) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct ButterworthLowPass {
    stages: [Biquad; 2],
    sample_rate: f32,
    cutoff_hz: f32,
}

impl ButterworthLowPass {
    pub fn new() -> Self {
        let mut filter = Self {
            stages: [Biquad::PASSTHROUGH; 2],
            sample_rate: 44_100.0,
            cutoff_hz: 0.0,
        };
        filter.set_cutoff(MAX_CUTOFF_HZ);
        filter
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        let cutoff = self.cutoff_hz;
        self.cutoff_hz = 0.0;
        self.set_cutoff(cutoff);
        self.reset();
    }

    /// Clamp a requested cutoff into the stable range for `sample_rate`.
    pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let ceiling = MAX_CUTOFF_HZ.min(sample_rate * 0.49).max(MIN_CUTOFF_HZ);
        if cutoff_hz.is_nan() {
            return ceiling;
        }
        cutoff_hz.clamp(MIN_CUTOFF_HZ, ceiling)
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff = Self::clamp_cutoff(cutoff_hz, self.sample_rate);
        if cutoff == self.cutoff_hz {
            return;
        }
        self.cutoff_hz = cutoff;
        for (stage, q) in self.stages.iter_mut().zip(STAGE_Q) {
            stage.set_lowpass(cutoff, q, self.sample_rate);
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mid = self.stages[0].process(input);
        self.stages[1].process(mid)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }
}

impl Default for ButterworthLowPass {
    fn default() -> Self {
        Self::new()
    }
}
