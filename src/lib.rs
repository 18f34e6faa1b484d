//! Polyphonic granular sample playback.
//!
//! A [`SamplePlayer`] renders up to [`MAX_VOICES`] voices, each made of
//! overlapping windowed grains read from one loaded recording. It runs inside
//! an audio callback; a [`PlayerHandle`] changes its settings and loads
//! samples from any other thread.

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod sample;
pub mod synth; // Grains, voices and the voice pool

pub use config::PlayerConfig;
pub use engine::{PlayerHandle, SamplePlayer};
pub use error::LoadError;
pub use synth::{MidiMessage, PlaybackMode};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_VOICES: usize = 16;
/// Upper bound on grains per voice.
pub const MAX_GRAINS: usize = 8;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
