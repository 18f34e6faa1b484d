//! One-time conditioning of a freshly decoded buffer.
//!
//! Runs on the control thread before the buffer is published, never inside
//! the audio callback. Order matters: the DC pass first so the offset does
//! not count toward the peak, then normalisation, then the boundary fades.

use crate::dsp::dc_blocker::DcBlocker;

/// Normalised peak, leaving headroom below full scale.
pub const NORMALIZE_TARGET: f32 = 0.95;
/// Upper bound on the fade length in frames.
pub const MAX_FADE_FRAMES: usize = 1000;

/// Run a DC blocker over each channel independently.
pub fn remove_dc(channels: &mut [Vec<f32>]) {
    for channel in channels.iter_mut() {
        let mut blocker = DcBlocker::new();
        blocker.render(channel);
    }
}

/// Largest absolute sample across all channels.
pub fn peak(channels: &[Vec<f32>]) -> f32 {
    channels
        .iter()
        .flat_map(|channel| channel.iter())
        .fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Scale so the peak lands on [`NORMALIZE_TARGET`]. Silence is left alone.
///
/// Returns the gain that was applied.
pub fn normalize(channels: &mut [Vec<f32>]) -> f32 {
    let peak = peak(channels);
    if peak <= 0.0 || !peak.is_finite() {
        return 1.0;
    }

    let gain = NORMALIZE_TARGET / peak;
    for sample in channels.iter_mut().flat_map(|channel| channel.iter_mut()) {
        *sample *= gain;
    }
    gain
}

/// Fade length for a buffer of `frames`: min(1000, 10% of the buffer).
pub fn fade_length(frames: usize) -> usize {
    MAX_FADE_FRAMES.min(frames / 10)
}

/// Smoothstep fade-in at the head and fade-out at the tail of every channel.
pub fn apply_fades(channels: &mut [Vec<f32>]) {
    for channel in channels.iter_mut() {
        let frames = channel.len();
        let fade = fade_length(frames);
        for i in 0..fade {
            let x = i as f32 / fade as f32;
            let gain = x * x * (3.0 - 2.0 * x);
            channel[i] *= gain;
            channel[frames - 1 - i] *= gain;
        }
    }
}

/// Average all channels into one playback channel.
pub fn mixdown(channels: &[Vec<f32>]) -> Vec<f32> {
    let frames = channels.first().map_or(0, Vec::len);
    if channels.len() == 1 {
        return channels[0].clone();
    }

    let scale = 1.0 / channels.len() as f32;
    (0..frames)
        .map(|i| channels.iter().map(|channel| channel[i]).sum::<f32>() * scale)
        .collect()
}
