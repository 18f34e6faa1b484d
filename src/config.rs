//! Tunable engine parameters.
//!
//! Everything here is read when voices are prepared. Values that must change
//! while audio runs (speed, loop, hold, mode) live in the transport instead.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::declick::DEFAULT_JUMP_THRESHOLD;
use crate::dsp::resampler::Interpolation;
use crate::MAX_GRAINS;

/// ADSR times in seconds, sustain as a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.2,
        }
    }
}

/// Grain scheduling and windowing.
///
/// `overlap` is the fraction of a grain's life that overlaps the next one: a
/// new grain spawns once the newest grain's phase reaches `1 - overlap`.
/// `edge_width` is the fraction at each end of the window that gets the extra
/// quadratic ease.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainConfig {
    /// Grain length in seconds
    pub duration: f32,
    pub overlap: f32,
    pub max_grains: usize,
    pub edge_width: f32,
    /// Added to `duration` per voice index
    pub duration_spread: f32,
    /// Added to `overlap` per voice index
    pub overlap_spread: f32,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            duration: 0.1,
            overlap: 0.5,
            max_grains: 4,
            edge_width: 0.15,
            duration_spread: 0.001,
            overlap_spread: 0.01,
        }
    }
}

impl GrainConfig {
    /// Grain length for the voice at `index`, clamped to something audible.
    pub fn duration_for(&self, index: usize) -> f32 {
        (self.duration + self.duration_spread * index as f32).clamp(0.002, 2.0)
    }

    /// Overlap for the voice at `index`, clamped to [0, 0.95].
    pub fn overlap_for(&self, index: usize) -> f32 {
        (self.overlap + self.overlap_spread * index as f32).clamp(0.0, 0.95)
    }

    pub fn max_grains(&self) -> usize {
        self.max_grains.clamp(1, MAX_GRAINS)
    }

    pub fn edge_width(&self) -> f32 {
        self.edge_width.clamp(0.0, 0.5)
    }
}

/// Per-note random variation. Zero disables a term.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterConfig {
    /// Velocity is scaled by `1 ± velocity`
    pub velocity: f32,
    /// Pitch is scaled by `1 + [0, detune)`
    pub detune: f32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            velocity: 0.02,
            detune: 0.002,
        }
    }
}

impl JitterConfig {
    pub fn none() -> Self {
        Self {
            velocity: 0.0,
            detune: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub envelope: EnvelopeConfig,
    pub grain: GrainConfig,
    pub interpolation: Interpolation,
    pub jitter: JitterConfig,
    /// Seed for the jitter generator
    pub seed: u64,
    /// Release time used by an explicit stop, in seconds
    pub stop_release: f32,
    pub limiter_threshold: f32,
    pub soft_clip_drive: f32,
    pub oversample_clipper: bool,
    /// Largest per-sample output jump a voice passes unsmoothed. `None`
    /// disables the stage.
    pub anti_click_threshold: Option<f32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            envelope: EnvelopeConfig::default(),
            grain: GrainConfig::default(),
            interpolation: Interpolation::Cubic,
            jitter: JitterConfig::default(),
            seed: 0x5AA7_6A1D,
            stop_release: 0.01,
            limiter_threshold: 0.95,
            soft_clip_drive: 0.8,
            oversample_clipper: true,
            anti_click_threshold: Some(DEFAULT_JUMP_THRESHOLD),
        }
    }
}

impl PlayerConfig {
    pub fn with_envelope(mut self, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        self.envelope = EnvelopeConfig {
            attack,
            decay,
            sustain,
            release,
        };
        self
    }

    pub fn with_grain(mut self, grain: GrainConfig) -> Self {
        self.grain = grain;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_jitter(mut self, jitter: JitterConfig) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_stop_release(mut self, seconds: f32) -> Self {
        self.stop_release = seconds;
        self
    }

    pub fn with_soft_clip(mut self, drive: f32, oversample: bool) -> Self {
        self.soft_clip_drive = drive;
        self.oversample_clipper = oversample;
        self
    }

    pub fn with_anti_click(mut self, threshold: Option<f32>) -> Self {
        self.anti_click_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_voice_spread_is_applied_and_clamped() {
        let grain = GrainConfig::default();
        assert!((grain.duration_for(0) - 0.1).abs() < 1e-6);
        assert!((grain.duration_for(10) - 0.11).abs() < 1e-6);
        assert!((grain.overlap_for(5) - 0.55).abs() < 1e-6);

        let wild = GrainConfig {
            overlap: 3.0,
            max_grains: 1_000,
            ..GrainConfig::default()
        };
        assert_eq!(wild.overlap_for(0), 0.95);
        assert_eq!(wild.max_grains(), MAX_GRAINS);
    }
}
