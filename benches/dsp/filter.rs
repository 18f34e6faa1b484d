//! Benchmarks for the Butterworth low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_grain::dsp::filter::ButterworthLowPass;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Anti-aliasing setting for a one-octave shift
        let mut filter = ButterworthLowPass::new();
        filter.prepare(48_000.0);
        filter.set_cutoff(10_000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Cutoff changes every block, as when a voice restarts
        let mut filter = ButterworthLowPass::new();
        filter.prepare(48_000.0);
        let mut buffer = input.clone();
        let mut cutoff = 1_000.0;
        group.bench_with_input(BenchmarkId::new("retune", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 15_000.0 { 1_000.0 } else { cutoff * 1.5 };
                filter.set_cutoff(black_box(cutoff));
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
