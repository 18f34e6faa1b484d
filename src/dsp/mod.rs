//! Low-level DSP primitives used by the voices and the output stage.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so they can be embedded directly inside voice structs. The sinc resampler
//! builds its kernel table in `new`, never while rendering.

/// One-pole DC blocking high-pass.
pub mod dc_blocker;
/// Halves sample-to-sample jumps above a threshold.
pub mod declick;
/// tanh soft clipper with optional oversampling.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// 4th-order Butterworth low-pass.
pub mod filter;
/// Output peak limiter.
pub mod limiter;
/// Fractional-position reads for grains.
pub mod resampler;

pub use envelope::EnvelopeState;
