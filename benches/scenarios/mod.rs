//! Real-world scenario benchmarks.
//!
//! These run the whole player: grains, voice chains, mix and limiter.

mod player;

pub use player::bench_player;
