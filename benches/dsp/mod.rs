//! Benchmarks for low-level DSP primitives.

mod distortion;
mod envelope;
mod filter;
mod limiter;
mod resampler;

pub use distortion::bench_distortion;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use limiter::bench_limiter;
pub use resampler::bench_resampler;
