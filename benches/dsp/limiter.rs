//! Benchmarks for the output peak limiter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_grain::dsp::limiter::PeakLimiter;

use crate::BLOCK_SIZES;

pub fn bench_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/limiter");

    for &size in BLOCK_SIZES {
        // A hot mix that keeps the limiter engaged
        let input: Vec<f32> = (0..size).map(|i| 3.0 * (i as f32 * 0.05).sin()).collect();

        let mut limiter = PeakLimiter::default();
        limiter.prepare(48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("engaged", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                limiter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
