//! Benchmarks for fractional-position reads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_grain::dsp::resampler::{Interpolation, Resampler};

use crate::BLOCK_SIZES;

pub fn bench_resampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resampler");
    let source: Vec<f32> = (0..48_000).map(|i| (i as f32 * 0.013).sin()).collect();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, mode) in [("cubic", Interpolation::Cubic), ("sinc", Interpolation::Sinc)] {
            let resampler = Resampler::new(mode);
            // Pitched up a fifth, reads land between samples
            let step = 1.498_307;
            let mut position = 0.0f64;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for out in buffer.iter_mut() {
                        *out = resampler.read(black_box(&source), position);
                        position += step;
                    }
                })
            });
        }
    }

    group.finish();
}
