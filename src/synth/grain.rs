use std::f32::consts::TAU;

/*
Grains
======

A grain is a short read cursor into the source with a finite life. Each
sample it reads one interpolated value at `position`, weights it by its
window, advances `position` by the voice's read step and ages by one.

    phase = age / length        0.0 at spawn, 1.0 at retirement

Overlapping grains, each faded in and out, sum into a continuous signal even
though every individual grain starts and stops.

Window
------

A Hann window with an extra quadratic ease over `edge` at each end:

    gain
     1 ┤        ╭──────╮
       │      ╭╯        ╰╮
       │    ╭╯            ╰╮
     0 ┼──══╯──────────────╰══──→ phase
       0  edge          1-edge  1

The ease flattens the first and last few percent of the Hann curve so the
grain boundaries are softer than a plain raised cosine.
*/

/// Hann window with quadratic-eased edges, `phase` in [0, 1].
#[inline]
pub fn window_gain(phase: f32, edge: f32) -> f32 {
    let phase = phase.clamp(0.0, 1.0);
    let hann = 0.5 * (1.0 - (TAU * phase).cos());

    if edge <= 0.0 {
        return hann;
    }
    if phase < edge {
        let t = phase / edge;
        hann * t * t
    } else if phase > 1.0 - edge {
        let t = (1.0 - phase) / edge;
        hann * t * t
    } else {
        hann
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Grain {
    /// Source position the grain was spawned at.
    pub start_position: f64,
    /// Read cursor, wraps modulo the buffer length when read.
    pub position: f64,
    /// Samples since spawn.
    pub age: u32,
    /// Lifetime in samples.
    pub length: u32,
    /// Window phase, `age / length`.
    pub phase: f32,
    pub active: bool,
    /// Fractional sample offset of the start position.
    pub initial_phase: f32,
    /// Window phase advance per sample.
    pub phase_increment: f32,
}

impl Grain {
    pub fn spawn(position: f64, length: u32) -> Self {
        let length = length.max(1);
        Self {
            start_position: position,
            position,
            age: 0,
            length,
            phase: 0.0,
            active: true,
            initial_phase: position.rem_euclid(1.0) as f32,
            phase_increment: 1.0 / length as f32,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.age >= self.length
    }

    /// Move the cursor and age by one sample.
    #[inline]
    pub fn advance(&mut self, step: f64) {
        self.position += step;
        self.age = self.age.saturating_add(1).min(self.length);
        self.phase = self.age as f32 * self.phase_increment;
    }

    pub fn retire(&mut self) {
        self.active = false;
    }
}
