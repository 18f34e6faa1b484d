//! Benchmarks for the voice soft clipper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_grain::dsp::distortion::{self, SoftClipper};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Plain tanh
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("soft_clip", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                distortion::soft_clip_buffer(black_box(&mut buffer), black_box(0.8));
            })
        });

        // 4x oversampled with its own low-pass, what every voice runs
        let mut clipper = SoftClipper::new(0.8, true);
        clipper.prepare(48_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("oversampled", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                clipper.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
