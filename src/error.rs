//! Error types surfaced to the control thread.
//!
//! The audio path never returns these: everything it could trip over is
//! clamped or wrapped instead.

use thiserror::Error;

/// Reasons a decoded buffer is refused by [`SampleStore::load`].
///
/// When a load fails the previously published sample stays active.
///
/// [`SampleStore::load`]: crate::sample::SampleStore::load
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The decoder produced no channels at all
    #[error("decoded buffer has no channels")]
    NoChannels,

    /// Every channel is zero frames long
    #[error("decoded buffer is empty")]
    EmptyBuffer,

    /// Channels of a planar buffer must share one length
    #[error("channel {channel} has {found} frames, expected {expected}")]
    MismatchedChannelLengths {
        channel: usize,
        expected: usize,
        found: usize,
    },

    /// Source sample rate must be finite and positive
    #[error("invalid source sample rate: {0}")]
    InvalidSampleRate(f64),
}
