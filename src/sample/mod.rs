//! Decoded sample data and the store that publishes it to the audio thread.
//!
//! Decoding is somebody else's job. This module accepts planar `f32`
//! channels plus their sample rate, conditions them once, and hands an
//! immutable [`SampleBuffer`] to the engine.

pub mod preprocess;
mod store;

pub use store::SampleStore;

use crate::error::LoadError;

/// An immutable, preprocessed recording.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    playback: Vec<f32>,
    sample_rate: f64,
    normalize_gain: f32,
}

impl SampleBuffer {
    /// Validate and condition a decoded buffer.
    ///
    /// Applies a DC-blocking pass per channel, peak normalisation to 0.95 and
    /// smoothstep fades at both ends, then derives the mono playback channel
    /// the grains read from.
    pub fn from_decoded(mut channels: Vec<Vec<f32>>, sample_rate: f64) -> Result<Self, LoadError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(LoadError::InvalidSampleRate(sample_rate));
        }
        let expected = channels.first().ok_or(LoadError::NoChannels)?.len();
        if let Some((channel, found)) = channels
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(LoadError::MismatchedChannelLengths {
                channel,
                expected,
                found,
            });
        }
        if expected == 0 {
            return Err(LoadError::EmptyBuffer);
        }

        for sample in channels.iter_mut().flat_map(|c| c.iter_mut()) {
            if !sample.is_finite() {
                *sample = 0.0;
            }
        }

        preprocess::remove_dc(&mut channels);
        let normalize_gain = preprocess::normalize(&mut channels);
        preprocess::apply_fades(&mut channels);
        let playback = preprocess::mixdown(&channels);

        Ok(Self {
            channels,
            playback,
            sample_rate,
            normalize_gain,
        })
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.playback.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playback.is_empty()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Mono mix of all channels, the signal grains read from.
    pub fn playback(&self) -> &[f32] {
        &self.playback
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn length_in_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate
    }

    /// Gain applied during normalisation (1.0 for silence).
    pub fn normalize_gain(&self) -> f32 {
        self.normalize_gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_malformed_buffers() {
        assert_eq!(
            SampleBuffer::from_decoded(vec![], 44_100.0).unwrap_err(),
            LoadError::NoChannels
        );
        assert_eq!(
            SampleBuffer::from_decoded(vec![vec![]], 44_100.0).unwrap_err(),
            LoadError::EmptyBuffer
        );
        assert_eq!(
            SampleBuffer::from_decoded(vec![vec![0.0; 4], vec![0.0; 3]], 44_100.0).unwrap_err(),
            LoadError::MismatchedChannelLengths {
                channel: 1,
                expected: 4,
                found: 3
            }
        );
        assert!(matches!(
            SampleBuffer::from_decoded(vec![vec![0.0; 4]], 0.0),
            Err(LoadError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn conditions_loaded_audio() {
        let tone: Vec<f32> = (0..10_000).map(|n| 0.3 * (n as f32 * 0.07).sin()).collect();
        let buffer = SampleBuffer::from_decoded(vec![tone.clone(), tone], 48_000.0).unwrap();

        assert_eq!(buffer.len(), 10_000);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.playback()[0], 0.0);
        assert_eq!(buffer.playback()[9_999], 0.0);

        let peak = preprocess::peak(&[buffer.playback().to_vec()]);
        assert!(peak <= preprocess::NORMALIZE_TARGET + 1e-6);
        assert!(peak > 0.9, "normalised peak {}", peak);
        assert!((buffer.length_in_seconds() - 10_000.0 / 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_samples_are_silenced() {
        let buffer =
            SampleBuffer::from_decoded(vec![vec![0.5, f32::NAN, f32::INFINITY, 0.5]], 8_000.0)
                .unwrap();
        assert!(buffer.playback().iter().all(|s| s.is_finite()));
    }
}
