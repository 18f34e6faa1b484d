use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Fractional-Position Reads
=========================

Grains read the source at `position += pitch_ratio * speed`, so almost every
read lands between two stored samples. The resampler turns a fractional
position into a value.

Every read wraps modulo the buffer length: a cursor past the end reads from the
start, a negative one from the end. The caller never has to bounds-check.

Cubic (Catmull-Rom)
-------------------

Four neighbours y0..y3 around the read point (y1 at floor(pos), t = frac):

    c0 = -0.5t³ +     t² - 0.5t
    c1 =  1.5t³ - 2.5 t²        + 1
    c2 = -1.5t³ + 2   t² + 0.5t
    c3 =  0.5t³ - 0.5 t²

    out = c0·y0 + c1·y1 + c2·y2 + c3·y3

Cheap, passes through the samples, mild high-frequency droop.

Windowed Sinc
-------------

SINC_POINTS taps on each side, weighted by a Blackman-windowed sinc. Kernel
rows for SINC_RESOLUTION fractional phases are built once when the resampler
is constructed; a read picks the nearest row, so the audio thread does no
trigonometry. Rows are normalised to unit DC gain.
*/

pub const SINC_POINTS: usize = 8;
const SINC_TAPS: usize = SINC_POINTS * 2;
const SINC_RESOLUTION: usize = 1024;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Cubic,
    Sinc,
}

pub struct Resampler {
    mode: Interpolation,
    kernel: Box<[[f32; SINC_TAPS]]>,
}

#[inline]
fn wrap_index(index: isize, len: usize) -> usize {
    index.rem_euclid(len as isize) as usize
}

fn blackman(distance: f64) -> f64 {
    let x = distance / SINC_POINTS as f64;
    if x.abs() >= 1.0 {
        return 0.0;
    }
    0.42 + 0.5 * (PI * x).cos() + 0.08 * (2.0 * PI * x).cos()
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn build_kernel() -> Box<[[f32; SINC_TAPS]]> {
    (0..=SINC_RESOLUTION)
        .map(|phase| {
            let frac = phase as f64 / SINC_RESOLUTION as f64;
            let mut row = [0.0f64; SINC_TAPS];
            for (tap, weight) in row.iter_mut().enumerate() {
                // tap 0 sits SINC_POINTS - 1 samples left of floor(pos)
                let offset = tap as f64 - (SINC_POINTS as f64 - 1.0);
                let distance = offset - frac;
                *weight = sinc(distance) * blackman(distance);
            }
            let sum: f64 = row.iter().sum();
            let mut out = [0.0f32; SINC_TAPS];
            for (o, w) in out.iter_mut().zip(row) {
                *o = (w / sum) as f32;
            }
            out
        })
        .collect()
}

impl Resampler {
    pub fn new(mode: Interpolation) -> Self {
        let kernel = match mode {
            Interpolation::Sinc => build_kernel(),
            Interpolation::Cubic => Vec::new().into_boxed_slice(),
        };
        Self { mode, kernel }
    }

    pub fn mode(&self) -> Interpolation {
        self.mode
    }

    /// Read `data` at a fractional, wrapping `position`.
    #[inline]
    pub fn read(&self, data: &[f32], position: f64) -> f32 {
        if data.is_empty() {
            return 0.0;
        }
        match self.mode {
            Interpolation::Cubic => read_cubic(data, position),
            Interpolation::Sinc => self.read_sinc(data, position),
        }
    }

    fn read_sinc(&self, data: &[f32], position: f64) -> f32 {
        let len = data.len();
        let position = position.rem_euclid(len as f64);
        let base = position.floor();
        let frac = position - base;
        let row = &self.kernel[(frac * SINC_RESOLUTION as f64).round() as usize];

        let first = base as isize - (SINC_POINTS as isize - 1);
        row.iter()
            .enumerate()
            .map(|(tap, weight)| data[wrap_index(first + tap as isize, len)] * weight)
            .sum()
    }
}

/// Catmull-Rom cubic read, wrapping at both ends.
#[inline]
pub fn read_cubic(data: &[f32], position: f64) -> f32 {
    let len = data.len();
    if len == 0 {
        return 0.0;
    }
    let position = position.rem_euclid(len as f64);
    let base = position.floor();
    let t = (position - base) as f32;
    let i = base as isize;

    let y0 = data[wrap_index(i - 1, len)];
    let y1 = data[wrap_index(i, len)];
    let y2 = data[wrap_index(i + 1, len)];
    let y3 = data[wrap_index(i + 2, len)];

    let t2 = t * t;
    let t3 = t2 * t;
    let c0 = -0.5 * t3 + t2 - 0.5 * t;
    let c1 = 1.5 * t3 - 2.5 * t2 + 1.0;
    let c2 = -1.5 * t3 + 2.0 * t2 + 0.5 * t;
    let c3 = 0.5 * t3 - 0.5 * t2;

    c0 * y0 + c1 * y1 + c2 * y2 + c3 * y3
}
