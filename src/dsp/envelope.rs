use crate::MIN_TIME;

/*
ADSR Envelope Implementation
============================

Every voice owns one of these. Its level multiplies the voice's grain sum, so
it decides when a note fades in, how long it rings, and when the voice slot
can be handed to another note.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release. A state machine
              governs transitions.

  increment   How much `level` changes per sample, derived from the stage
              duration and the sample rate:

                  increment = target_change / (time_seconds * sample_rate)


The State Machine
-----------------

    Idle ──note_on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
     ↑                  │                   │                   │
     │                  └──────note_off─────┴──────note_off─────┤
     │                                                          ↓
     └────────────────────level ≤ ε──────────────────────── Release

note_off moves any non-Idle stage straight to Release and snapshots the
current level as the release start, so releasing during the attack never
jumps up to the sustain level first.

note_on always re-enters Attack. When the previous stage was Release the ramp
continues from the current level instead of dropping to zero, which keeps
rapid retriggers click-free. The previous stage is read BEFORE the new one is
written.

Release interpolates from the snapshot to zero over a precomputed number of
samples, and snaps to Idle as soon as the level falls under RELEASE_EPSILON.
*/

/// Release is considered finished below this level.
pub const RELEASE_EPSILON: f32 = 0.001;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // level = 0, voice may be reused
    Attack,  // ramping up to 1.0
    Decay,   // ramping down to sustain level
    Sustain, // holding while the note is held
    Release, // ramping down to 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,
    sample_rate: f32,

    stage: EnvelopeState,
    level: f32,
    stage_samples: u32, // samples spent in the current stage

    release_start_level: f32,
    release_total_samples: u32,
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.2)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),
            sample_rate: 44_100.0,

            stage: EnvelopeState::Idle,
            level: 0.0,
            stage_samples: 0,
            release_start_level: 0.0,
            release_total_samples: 1,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
    }

    /// Gate high. Continues from the current level when retriggered out of
    /// Release, starts from zero otherwise.
    pub fn note_on(&mut self) {
        let previous = self.stage;
        if previous != EnvelopeState::Release {
            self.level = 0.0;
        }
        self.stage = EnvelopeState::Attack;
        self.stage_samples = 0;
    }

    /// Gate low: release from the current level over the configured time.
    pub fn note_off(&mut self) {
        self.note_off_with(self.release_time);
    }

    /// Gate low with an explicit release time, used for fast forced stops.
    pub fn note_off_with(&mut self, release_time: f32) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples =
            (release_time.max(MIN_TIME) * self.sample_rate).round().max(1.0) as u32;
        self.stage_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn process(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let increment = 1.0 / (self.attack_time * self.sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.enter(EnvelopeState::Decay);
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let decrement = (1.0 - target) / (self.decay_time * self.sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.enter(EnvelopeState::Sustain);
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                self.stage_samples = self.stage_samples.saturating_add(1);
                let progress = self.stage_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                if self.level <= RELEASE_EPSILON
                    || self.stage_samples >= self.release_total_samples
                {
                    self.level = 0.0;
                    self.enter(EnvelopeState::Idle);
                }
                return self.level;
            }
        }

        self.stage_samples = self.stage_samples.saturating_add(1);
        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }

    #[inline]
    fn enter(&mut self, stage: EnvelopeState) {
        self.stage = stage;
        self.stage_samples = 0;
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.stage_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
