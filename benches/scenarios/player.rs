//! Benchmarks for full player blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_grain::{
    dsp::resampler::Interpolation, MidiMessage, PlayerConfig, SamplePlayer, MAX_VOICES,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn loaded_player(interpolation: Interpolation, voices: usize) -> SamplePlayer {
    let (mut player, handle) =
        SamplePlayer::new(PlayerConfig::default().with_interpolation(interpolation));
    player.prepare(SAMPLE_RATE, 512);

    // Two seconds of a stereo chord at 44.1 kHz, so every read is rate converted
    let frames = 88_200;
    let left: Vec<f32> = (0..frames).map(|n| (n as f32 * 0.031).sin()).collect();
    let right: Vec<f32> = (0..frames).map(|n| (n as f32 * 0.047).sin()).collect();
    handle
        .load_sample(vec![left, right], 44_100.0)
        .expect("bench sample loads");
    handle.set_looping(true);

    // Absorb the load before starting notes
    player.process_block(&mut [vec![0.0f32; 64]], 0, 64);
    for i in 0..voices {
        player.handle_midi_message(MidiMessage::NoteOn {
            note: 48 + (i as u8 * 3) % 36,
            velocity: 0.8,
        });
    }
    player
}

pub fn bench_player(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/player");

    for &size in BLOCK_SIZES {
        let mut output = vec![vec![0.0f32; size], vec![0.0f32; size]];

        // === SINGLE NOTE ===
        let mut player = loaded_player(Interpolation::Cubic, 1);
        group.bench_with_input(BenchmarkId::new("one_voice", size), &size, |b, &size| {
            b.iter(|| {
                player.process_block(black_box(&mut output), 0, size);
            })
        });

        // === FULL POLYPHONY ===
        // Worst case the engine is sized for
        let mut player = loaded_player(Interpolation::Cubic, MAX_VOICES);
        group.bench_with_input(BenchmarkId::new("all_voices", size), &size, |b, &size| {
            b.iter(|| {
                player.process_block(black_box(&mut output), 0, size);
            })
        });

        let mut player = loaded_player(Interpolation::Sinc, MAX_VOICES);
        group.bench_with_input(
            BenchmarkId::new("all_voices_sinc", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    player.process_block(black_box(&mut output), 0, size);
                })
            },
        );
    }

    group.finish();
}
