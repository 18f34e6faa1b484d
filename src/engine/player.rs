use std::sync::Arc;

use crate::config::PlayerConfig;
use crate::dsp::limiter::PeakLimiter;
use crate::dsp::resampler::Resampler;
use crate::engine::{PlayerHandle, Shared};
use crate::synth::{MessageReceiver, MidiMessage, PlaybackMode, RenderCtx, VoicePool};
use crate::MAX_BLOCK_SIZE;

/*
Block Processing
================

    ┌──────────────┐ atomics / ArcSwap ┌───────────────────────────────┐
    │ PlayerHandle │ ─────────────────→ │ SamplePlayer (audio thread)   │
    │ (control)    │ ←───────────────── │                               │
    └──────────────┘  level, position  │  voices ─→ Σ ─→ limiter ─→ out │
                                        └───────────────────────────────┘

Per block:

1. Disabled: return without touching the output.
2. Sample generation changed: hard-reset every voice. Their cursors point
   into a buffer that no longer exists.
3. Stop counter changed: fast release on every voice.
4. Nothing loaded: write silence.
5. Snapshot the transport once, then render in chunks of the preallocated
   mix buffer: clear, sum voices, limit, copy to every output channel.
6. Publish the block peak and the lead voice position.

Nothing in this path allocates, locks or logs.
*/

/// Audio-thread half of the engine.
///
/// Owns every voice and all DSP state. Created together with a
/// [`PlayerHandle`] by [`SamplePlayer::new`]; move it into the audio
/// callback and keep the handle on the control side.
pub struct SamplePlayer {
    shared: Arc<Shared>,
    pool: VoicePool,
    resampler: Resampler,
    limiter: PeakLimiter,
    mix: Vec<f32>,
    sample_rate: f32,
    stop_release: f32,
    seen_generation: u64,
    seen_stop_requests: u64,
}

impl SamplePlayer {
    pub fn new(config: PlayerConfig) -> (Self, PlayerHandle) {
        let shared = Arc::new(Shared::default());
        let handle = PlayerHandle::new(Arc::clone(&shared));

        let mut player = Self {
            seen_generation: shared.store.generation(),
            seen_stop_requests: shared.transport.stop_requests(),
            shared,
            pool: VoicePool::new(&config),
            resampler: Resampler::new(config.interpolation),
            limiter: PeakLimiter::new(config.limiter_threshold),
            mix: Vec::new(),
            sample_rate: 44_100.0,
            stop_release: config.stop_release,
        };
        player.prepare(44_100.0, MAX_BLOCK_SIZE);
        (player, handle)
    }

    /// Another handle onto the same shared state.
    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle::new(Arc::clone(&self.shared))
    }

    /// Bind to the host rate and preallocate for blocks of up to
    /// `max_block_size` frames. Call from the control thread before audio
    /// starts. Larger blocks still render, in several chunks.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate.max(1.0);
        self.mix = vec![0.0; max_block_size.max(1)];
        self.pool.prepare(self.sample_rate);
        self.limiter.prepare(self.sample_rate);
        self.shared.transport.publish_meters(0.0, 0.0, 0);
    }

    /// Drop the mix buffer and silence every voice. Output stays silent
    /// until the next [`prepare`](Self::prepare).
    pub fn release_resources(&mut self) {
        self.pool.kill_all();
        self.limiter.reset();
        self.mix = Vec::new();
        self.shared.transport.publish_meters(0.0, 0.0, 0);
    }

    /// Apply one note event immediately.
    pub fn handle_midi_message(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { note, velocity } => {
                let frames = self.shared.store.frames();
                if frames == 0 {
                    return;
                }
                let transport = &self.shared.transport;
                let start = if transport.hold() {
                    transport.hold_position() * frames as f64
                } else {
                    0.0
                };
                self.pool
                    .note_on(note.min(127), velocity, transport.mode(), start);
            }
            MidiMessage::NoteOff { note } => {
                self.pool.note_off(note, self.shared.transport.mode());
            }
            MidiMessage::AllNotesOff => {
                if self.shared.transport.mode() == PlaybackMode::Polyphonic {
                    self.pool.release_all();
                }
            }
            MidiMessage::StopAll => self.pool.stop_all(self.stop_release),
        }
    }

    /// Apply every pending event from `rx`. Call at the start of a block.
    pub fn drain_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.handle_midi_message(message);
        }
    }

    /// Render `num_samples` frames starting at `start_sample` into every
    /// channel of `output`. The same mono signal goes to each channel.
    pub fn process_block<C: AsMut<[f32]>>(
        &mut self,
        output: &mut [C],
        start_sample: usize,
        num_samples: usize,
    ) {
        let transport = &self.shared.transport;
        if !transport.enabled() {
            return;
        }

        // The store swaps the buffer before bumping the generation, so a
        // guard loaded first is never newer than the generation seen here.
        let guard = self.shared.store.current();
        let generation = self.shared.store.generation();
        if generation != self.seen_generation {
            self.seen_generation = generation;
            self.pool.kill_all();
        }

        let stop_requests = transport.stop_requests();
        if stop_requests != self.seen_stop_requests {
            self.seen_stop_requests = stop_requests;
            self.pool.stop_all(self.stop_release);
        }

        let buffer = match &*guard {
            Some(buffer) if !buffer.is_empty() && !self.mix.is_empty() => buffer,
            _ => {
                for channel in output.iter_mut() {
                    let channel = channel.as_mut();
                    let end = (start_sample + num_samples).min(channel.len());
                    if start_sample < end {
                        channel[start_sample..end].fill(0.0);
                    }
                }
                transport.publish_meters(0.0, 0.0, self.pool.active_count());
                return;
            }
        };

        let source = buffer.playback();
        let frames = source.len() as f64;
        let ctx = RenderCtx {
            speed: transport.speed() as f64,
            rate_ratio: buffer.sample_rate() / self.sample_rate as f64,
            looping: transport.looping(),
            hold: transport
                .hold()
                .then(|| transport.hold_position() * frames),
        };

        let mut peak = 0.0f32;
        let mut offset = 0;
        while offset < num_samples {
            let len = (num_samples - offset).min(self.mix.len());
            let mix = &mut self.mix[..len];

            mix.fill(0.0);
            self.pool.render(mix, source, &self.resampler, &ctx);
            self.limiter.render(mix);

            for &sample in mix.iter() {
                peak = peak.max(sample.abs());
            }

            let at = start_sample + offset;
            for channel in output.iter_mut() {
                let channel = channel.as_mut();
                let end = (at + len).min(channel.len());
                if at < end {
                    channel[at..end].copy_from_slice(&mix[..end - at]);
                }
            }
            offset += len;
        }

        let position = self
            .pool
            .lead_position()
            .map_or(0.0, |p| (p / frames).clamp(0.0, 1.0));
        transport.publish_meters(peak.min(1.0), position, self.pool.active_count());
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn active_voice_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn is_file_loaded(&self) -> bool {
        self.shared.store.is_loaded()
    }

    pub fn length_in_seconds(&self) -> f64 {
        self.shared.store.length_in_seconds()
    }

    pub fn current_level(&self) -> f32 {
        self.shared.transport.level()
    }

    pub fn current_position(&self) -> f64 {
        self.shared.transport.position()
    }

    pub fn hold_position(&self) -> f64 {
        self.shared.transport.hold_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_player() -> (SamplePlayer, PlayerHandle) {
        let (mut player, handle) = SamplePlayer::new(PlayerConfig::default());
        player.prepare(8_000.0, 128);
        let tone: Vec<f32> = (0..16_000).map(|n| (n as f32 * 0.05).sin()).collect();
        handle.load_sample(vec![tone], 8_000.0).unwrap();
        (player, handle)
    }

    #[test]
    fn disabled_player_leaves_output_untouched() {
        let (mut player, handle) = loaded_player();
        handle.set_enabled(false);
        player.handle_midi_message(MidiMessage::NoteOn {
            note: 60,
            velocity: 1.0,
        });

        let mut out = vec![vec![0.25f32; 64]];
        player.process_block(&mut out, 0, 64);
        assert!(out[0].iter().all(|&s| s == 0.25));
    }

    #[test]
    fn renders_only_the_requested_range() {
        let (mut player, _handle) = loaded_player();
        player.process_block(&mut [vec![0.0f32; 8]], 0, 8);
        player.handle_midi_message(MidiMessage::NoteOn {
            note: 60,
            velocity: 1.0,
        });

        let mut out = vec![vec![9.0f32; 600], vec![9.0f32; 600]];
        player.process_block(&mut out, 100, 400);
        for channel in &out {
            assert!(channel[..100].iter().all(|&s| s == 9.0));
            assert!(channel[500..].iter().all(|&s| s == 9.0));
            assert!(channel[100..500].iter().any(|&s| s != 0.0 && s != 9.0));
        }
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn new_sample_resets_voices() {
        let (mut player, handle) = loaded_player();
        player.process_block(&mut [vec![0.0f32; 8]], 0, 8);
        player.handle_midi_message(MidiMessage::NoteOn {
            note: 60,
            velocity: 1.0,
        });
        player.process_block(&mut [vec![0.0f32; 64]], 0, 64);
        assert_eq!(player.active_voice_count(), 1);

        handle.load_sample(vec![vec![0.1; 4_000]], 8_000.0).unwrap();
        player.process_block(&mut [vec![0.0f32; 64]], 0, 64);
        assert_eq!(player.active_voice_count(), 0);
    }

    #[test]
    fn note_on_without_sample_is_ignored() {
        let (mut player, _handle) = SamplePlayer::new(PlayerConfig::default());
        player.handle_midi_message(MidiMessage::NoteOn {
            note: 60,
            velocity: 1.0,
        });
        assert_eq!(player.active_voice_count(), 0);
    }

    #[test]
    fn released_resources_render_silence() {
        let (mut player, _handle) = loaded_player();
        player.handle_midi_message(MidiMessage::NoteOn {
            note: 60,
            velocity: 1.0,
        });
        player.release_resources();

        let mut out = vec![vec![1.0f32; 32]];
        player.process_block(&mut out, 0, 32);
        assert!(out[0].iter().all(|&s| s == 0.0));
    }
}
