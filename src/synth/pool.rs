use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{JitterConfig, PlayerConfig};
use crate::dsp::resampler::Resampler;
use crate::synth::voice::{RenderCtx, Voice};
use crate::MAX_VOICES;

/// How note events map onto voices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PlaybackMode {
    /// One voice per note, note-off releases it.
    #[default]
    Polyphonic = 0,
    /// A new note silences whatever was playing. Note-off is ignored.
    Monophonic = 1,
    /// Every note plays out on its own voice. Note-off is ignored.
    OneShot = 2,
}

impl PlaybackMode {
    pub const ALL: [PlaybackMode; 3] = [
        PlaybackMode::Polyphonic,
        PlaybackMode::Monophonic,
        PlaybackMode::OneShot,
    ];

    /// Unknown values fall back to Polyphonic.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackMode::Monophonic,
            2 => PlaybackMode::OneShot,
            _ => PlaybackMode::Polyphonic,
        }
    }

    pub fn next(self) -> Self {
        Self::from_u8((self as u8 + 1) % Self::ALL.len() as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaybackMode::Polyphonic => "Polyphonic",
            PlaybackMode::Monophonic => "Monophonic",
            PlaybackMode::OneShot => "One-shot",
        }
    }
}

/// Fixed set of [`MAX_VOICES`] voices plus the allocation policy.
pub struct VoicePool {
    voices: [Voice; MAX_VOICES],
    jitter: JitterConfig,
    rng: SmallRng,
}

impl VoicePool {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            voices: std::array::from_fn(|index| Voice::new(index, config)),
            jitter: config.jitter,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        for voice in self.voices.iter_mut() {
            voice.prepare(sample_rate);
        }
    }

    /// Start `note` according to `mode`. Returns the index of the voice used.
    pub fn note_on(
        &mut self,
        note: u8,
        velocity: f32,
        mode: PlaybackMode,
        start_position: f64,
    ) -> usize {
        if mode == PlaybackMode::Monophonic {
            self.kill_all();
        }

        let (velocity, detune) = self.humanize(velocity);
        let index = match mode {
            PlaybackMode::Polyphonic => self.sounding(note).unwrap_or_else(|| self.allocate()),
            _ => self.allocate(),
        };
        self.voices[index].start(note, velocity, start_position, detune);
        index
    }

    /// Release voices playing `note`. Ignored outside Polyphonic mode.
    pub fn note_off(&mut self, note: u8, mode: PlaybackMode) {
        if mode != PlaybackMode::Polyphonic {
            return;
        }
        for voice in self.voices.iter_mut() {
            if voice.is_active() && voice.note() == note {
                voice.release();
            }
        }
    }

    /// Release every active voice with its normal release time.
    pub fn release_all(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.release();
        }
    }

    /// Fast fade on every active voice.
    pub fn stop_all(&mut self, release_time: f32) {
        for voice in self.voices.iter_mut() {
            voice.force_release(release_time);
        }
    }

    /// Hard reset of every voice, no fade.
    pub fn kill_all(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.kill();
        }
    }

    // Polyphonic keys map to a single voice. A repeated note-on retriggers it.
    fn sounding(&self, note: u8) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| v.is_active() && !v.is_free() && v.note() == note)
    }

    /// Pick a voice for a new note.
    ///
    /// First pass takes the first free voice. If all are busy the quietest
    /// voice is stolen, ties going to the lowest index.
    fn allocate(&mut self) -> usize {
        if let Some(index) = self.voices.iter().position(Voice::is_free) {
            return index;
        }

        let mut steal = 0;
        let mut quietest = f32::MAX;
        for (index, voice) in self.voices.iter().enumerate() {
            if voice.level() < quietest {
                quietest = voice.level();
                steal = index;
            }
        }
        steal
    }

    fn humanize(&mut self, velocity: f32) -> (f32, f64) {
        let mut velocity = velocity.clamp(0.0, 1.0);
        if self.jitter.velocity > 0.0 {
            let spread = self.rng.gen_range(-1.0f32..=1.0);
            velocity = (velocity * (1.0 + self.jitter.velocity * spread)).clamp(0.0, 1.0);
        }

        let mut detune = 1.0;
        if self.jitter.detune > 0.0 {
            detune += self.jitter.detune as f64 * self.rng.gen::<f64>();
        }
        (velocity, detune)
    }

    /// Mix every active voice into `out`. `out` is not cleared.
    pub fn render(
        &mut self,
        out: &mut [f32],
        source: &[f32],
        resampler: &Resampler,
        ctx: &RenderCtx,
    ) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render(out, source, resampler, ctx);
        }
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Read position of the lowest-index active voice.
    pub fn lead_position(&self) -> Option<f64> {
        self.voices
            .iter()
            .find(|v| v.is_active())
            .map(Voice::position)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::resampler::Interpolation;

    fn pool() -> VoicePool {
        let config = PlayerConfig::default().with_jitter(JitterConfig::none());
        let mut pool = VoicePool::new(&config);
        pool.prepare(10_000.0);
        pool
    }

    fn run(pool: &mut VoicePool, samples: usize) {
        let data: Vec<f32> = (0..100_000).map(|n| (n as f32 * 0.01).sin()).collect();
        let resampler = Resampler::new(Interpolation::Cubic);
        let ctx = RenderCtx {
            looping: true,
            ..RenderCtx::new(1.0, 1.0)
        };
        let mut out = vec![0.0; samples];
        pool.render(&mut out, &data, &resampler, &ctx);
    }

    #[test]
    fn mode_cycles_and_round_trips_through_u8() {
        for mode in PlaybackMode::ALL {
            assert_eq!(PlaybackMode::from_u8(mode as u8), mode);
        }
        assert_eq!(PlaybackMode::OneShot.next(), PlaybackMode::Polyphonic);
        assert_eq!(PlaybackMode::from_u8(200), PlaybackMode::Polyphonic);
    }

    #[test]
    fn allocates_free_voices_in_order() {
        let mut pool = pool();
        assert_eq!(pool.note_on(60, 1.0, PlaybackMode::Polyphonic, 0.0), 0);
        assert_eq!(pool.note_on(62, 1.0, PlaybackMode::Polyphonic, 0.0), 1);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn repeated_polyphonic_note_reuses_its_voice() {
        let mut pool = pool();
        for _ in 0..3 {
            assert_eq!(pool.note_on(60, 1.0, PlaybackMode::Polyphonic, 0.0), 0);
            run(&mut pool, 64);
        }
        assert_eq!(pool.active_count(), 1);

        pool.note_off(60, PlaybackMode::Polyphonic);
        run(&mut pool, 200);
        let releasing = pool.voices()[0].level();
        assert!(releasing > 0.0);

        // retrigger from release picks up where the fade is
        assert_eq!(pool.note_on(60, 1.0, PlaybackMode::Polyphonic, 0.0), 0);
        run(&mut pool, 1);
        assert_eq!(pool.active_count(), 1);
        assert!((pool.voices()[0].level() - releasing).abs() <= 0.011);
    }

    #[test]
    fn one_shot_stacks_repeated_notes() {
        let mut pool = pool();
        pool.note_on(60, 1.0, PlaybackMode::OneShot, 0.0);
        pool.note_on(60, 1.0, PlaybackMode::OneShot, 0.0);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn steals_quietest_voice_when_full() {
        let mut pool = pool();
        for i in 0..MAX_VOICES {
            pool.note_on(40 + i as u8, 1.0, PlaybackMode::Polyphonic, 0.0);
        }
        // Let every voice settle at sustain, then start releasing voice 5.
        run(&mut pool, 2_000);
        pool.note_off(45, PlaybackMode::Polyphonic);
        run(&mut pool, 100);

        let index = pool.note_on(90, 1.0, PlaybackMode::Polyphonic, 0.0);
        assert_eq!(index, 5);
        assert_eq!(pool.voices()[5].note(), 90);
        assert_eq!(pool.active_count(), MAX_VOICES);
    }

    #[test]
    fn steal_ties_go_to_lowest_index() {
        let mut pool = pool();
        for i in 0..MAX_VOICES {
            pool.note_on(40 + i as u8, 1.0, PlaybackMode::Polyphonic, 0.0);
        }
        // Nothing rendered, every level is zero.
        assert_eq!(pool.note_on(100, 1.0, PlaybackMode::Polyphonic, 0.0), 0);
    }

    #[test]
    fn monophonic_keeps_a_single_voice() {
        let mut pool = pool();
        pool.note_on(60, 1.0, PlaybackMode::Monophonic, 0.0);
        run(&mut pool, 100);
        pool.note_on(64, 1.0, PlaybackMode::Monophonic, 0.0);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.voices()[0].note(), 64);
    }

    #[test]
    fn note_off_only_applies_to_polyphonic() {
        let mut pool = pool();
        pool.note_on(60, 1.0, PlaybackMode::OneShot, 0.0);
        pool.note_off(60, PlaybackMode::OneShot);
        run(&mut pool, 5_000);
        assert_eq!(pool.active_count(), 1);

        pool.note_off(60, PlaybackMode::Polyphonic);
        run(&mut pool, 5_000);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn stop_all_fades_quickly() {
        let mut pool = pool();
        pool.note_on(60, 1.0, PlaybackMode::Polyphonic, 0.0);
        pool.note_on(67, 1.0, PlaybackMode::Polyphonic, 0.0);
        run(&mut pool, 500);

        pool.stop_all(0.01);
        run(&mut pool, 150);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn jitter_is_deterministic_for_a_seed() {
        let config = PlayerConfig::default().with_seed(7);
        let mut a = VoicePool::new(&config);
        let mut b = VoicePool::new(&config);
        a.note_on(60, 0.5, PlaybackMode::Polyphonic, 0.0);
        b.note_on(60, 0.5, PlaybackMode::Polyphonic, 0.0);

        let (va, vb) = (a.voices()[0].velocity(), b.voices()[0].velocity());
        assert_eq!(va, vb);
        assert!((va - 0.5).abs() <= 0.5 * 0.02 + 1e-6);
    }
}
