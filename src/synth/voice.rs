use crate::config::PlayerConfig;
use crate::dsp::dc_blocker::DcBlocker;
use crate::dsp::declick::Declicker;
use crate::dsp::distortion::SoftClipper;
use crate::dsp::envelope::{Envelope, EnvelopeState};
use crate::dsp::filter::{ButterworthLowPass, MAX_CUTOFF_HZ};
use crate::dsp::resampler::Resampler;
use crate::synth::grain::{window_gain, Grain};
use crate::MAX_GRAINS;

/// MIDI note that plays the sample at its recorded pitch.
pub const ROOT_NOTE: u8 = 60;

/// Equal-tempered read-rate multiplier for `note`, relative to [`ROOT_NOTE`].
#[inline]
pub fn pitch_ratio(note: u8) -> f64 {
    2f64.powf((note as f64 - ROOT_NOTE as f64) / 12.0)
}

/// Anti-aliasing cutoff for an upward pitch shift.
#[inline]
pub fn anti_alias_cutoff(pitch_ratio: f64) -> f32 {
    (MAX_CUTOFF_HZ as f64 / pitch_ratio.max(1.0)).min(MAX_CUTOFF_HZ as f64) as f32
}

/// Per-block view of the transport, shared by every voice.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    /// Global time-stretch multiplier.
    pub speed: f64,
    /// Source sample rate over host sample rate.
    pub rate_ratio: f64,
    pub looping: bool,
    /// Frozen read position in source frames, when hold mode is engaged.
    pub hold: Option<f64>,
}

impl RenderCtx {
    pub fn new(speed: f64, rate_ratio: f64) -> Self {
        Self {
            speed,
            rate_ratio,
            looping: false,
            hold: None,
        }
    }
}

/// One note: a read cursor, its grains and a private processing chain.
///
/// All storage is inline. Starting, stopping and rendering never allocate.
#[derive(Debug, Clone)]
pub struct Voice {
    index: usize,
    active: bool,
    note: u8,
    velocity: f32,
    position: f64,
    pitch_ratio: f64,
    detune: f64,

    grains: [Grain; MAX_GRAINS],
    newest: Option<usize>,
    grain_duration: f32,
    grain_length: u32,
    overlap: f32,
    max_grains: usize,
    edge_width: f32,

    envelope: Envelope,
    anti_alias: ButterworthLowPass,
    anti_alias_enabled: bool,
    dc_blocker: DcBlocker,
    clipper: SoftClipper,
    declicker: Option<Declicker>,
}

impl Voice {
    pub fn new(index: usize, config: &PlayerConfig) -> Self {
        let env = config.envelope;
        let grain_duration = config.grain.duration_for(index);

        Self {
            index,
            active: false,
            note: 0,
            velocity: 0.0,
            position: 0.0,
            pitch_ratio: 1.0,
            detune: 1.0,

            grains: [Grain::default(); MAX_GRAINS],
            newest: None,
            grain_duration,
            grain_length: (grain_duration * 44_100.0) as u32,
            overlap: config.grain.overlap_for(index),
            max_grains: config.grain.max_grains(),
            edge_width: config.grain.edge_width(),

            envelope: Envelope::adsr(env.attack, env.decay, env.sustain, env.release),
            anti_alias: ButterworthLowPass::new(),
            anti_alias_enabled: false,
            dc_blocker: DcBlocker::new(),
            clipper: SoftClipper::new(config.soft_clip_drive, config.oversample_clipper),
            declicker: config.anti_click_threshold.map(Declicker::new),
        }
    }

    /// Bind to the host rate. Resets all state.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.grain_length = (self.grain_duration * sample_rate).round().max(1.0) as u32;
        self.envelope.prepare(sample_rate);
        self.anti_alias.prepare(sample_rate);
        self.clipper.prepare(sample_rate);
        self.kill();
    }

    /// Begin a note at `position` (source frames). `detune` multiplies the
    /// read rate.
    pub fn start(&mut self, note: u8, velocity: f32, position: f64, detune: f64) {
        self.clear_grains();
        self.anti_alias.reset();
        self.dc_blocker.reset();
        self.clipper.reset();
        if let Some(declicker) = self.declicker.as_mut() {
            declicker.reset();
        }
        // A finished voice must not hand its old level to the next note
        if !self.active {
            self.envelope.reset();
        }

        self.note = note;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.position = position.max(0.0);
        self.pitch_ratio = pitch_ratio(note);
        self.detune = detune;

        self.anti_alias_enabled = self.pitch_ratio > 1.0;
        if self.anti_alias_enabled {
            self.anti_alias
                .set_cutoff(anti_alias_cutoff(self.pitch_ratio));
        }

        self.active = true;
        self.envelope.note_on();
    }

    /// Key up: enter the envelope's release.
    pub fn release(&mut self) {
        if self.active {
            self.envelope.note_off();
        }
    }

    /// Quick fade used by an explicit stop. Drops the current grains.
    pub fn force_release(&mut self, release_time: f32) {
        if self.active {
            self.envelope.note_off_with(release_time);
            self.clear_grains();
        }
    }

    /// Silence immediately and return to the free list.
    pub fn kill(&mut self) {
        self.active = false;
        self.envelope.reset();
        self.clear_grains();
        self.anti_alias.reset();
        self.dc_blocker.reset();
        self.clipper.reset();
        if let Some(declicker) = self.declicker.as_mut() {
            declicker.reset();
        }
    }

    /// Mix this voice into `out`.
    pub fn render(
        &mut self,
        out: &mut [f32],
        source: &[f32],
        resampler: &Resampler,
        ctx: &RenderCtx,
    ) {
        if source.is_empty() {
            self.kill();
            return;
        }

        let frames = source.len() as f64;
        let step = self.pitch_ratio * self.detune * ctx.speed * ctx.rate_ratio;

        for sample in out.iter_mut() {
            if !self.active {
                break;
            }

            if let Some(hold) = ctx.hold {
                self.position = hold.clamp(0.0, frames - 1.0);
            }

            self.retire_grains();
            if self.wants_grain() {
                self.spawn_grain(self.position);
            }

            let mut sum = 0.0;
            for grain in self.grains.iter_mut().filter(|g| g.active) {
                let gain = window_gain(grain.phase, self.edge_width);
                sum += resampler.read(source, grain.position) * gain;
                grain.advance(step);
            }

            if ctx.hold.is_none() {
                self.position += step;
            }

            if self.position >= frames {
                if ctx.looping {
                    self.position = self.position.rem_euclid(frames);
                    if self.active_grains() < self.max_grains {
                        self.spawn_grain(self.position);
                    }
                } else if ctx.hold.is_some() {
                    self.position = frames - 1.0;
                } else {
                    self.finish();
                }
            }

            let mut x = sum;
            if self.anti_alias_enabled {
                x = self.anti_alias.process(x);
            }
            x = self.dc_blocker.process(x);
            x = self.clipper.process(x);

            let level = self.envelope.process();
            x *= level * self.velocity;
            if let Some(declicker) = self.declicker.as_mut() {
                x = declicker.process(x);
            }

            *sample += x;

            if self.envelope.state() == EnvelopeState::Idle {
                self.active = false;
                self.clear_grains();
            }
        }
    }

    // Ran off the end of a non-looping buffer.
    fn finish(&mut self) {
        self.active = false;
        self.envelope.reset();
        self.clear_grains();
    }

    fn retire_grains(&mut self) {
        for grain in self.grains.iter_mut() {
            if grain.active && grain.is_finished() {
                grain.retire();
            }
        }
        if let Some(newest) = self.newest {
            if !self.grains[newest].active {
                self.newest = None;
            }
        }
    }

    fn wants_grain(&self) -> bool {
        if self.active_grains() >= self.max_grains {
            return false;
        }
        match self.newest {
            None => true,
            Some(newest) => self.grains[newest].phase >= 1.0 - self.overlap,
        }
    }

    fn spawn_grain(&mut self, position: f64) {
        if let Some(slot) = self.grains[..self.max_grains]
            .iter()
            .position(|g| !g.active)
        {
            self.grains[slot] = Grain::spawn(position, self.grain_length);
            self.newest = Some(slot);
        }
    }

    fn clear_grains(&mut self) {
        for grain in self.grains.iter_mut() {
            grain.retire();
        }
        self.newest = None;
    }

    /// Free for allocation: not playing, or its envelope has finished.
    pub fn is_free(&self) -> bool {
        !self.active || self.envelope.state() == EnvelopeState::Idle
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Read cursor in source frames.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn pitch_ratio(&self) -> f64 {
        self.pitch_ratio
    }

    pub fn level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    pub fn active_grains(&self) -> usize {
        self.grains.iter().filter(|g| g.active).count()
    }

    pub fn grain_length(&self) -> u32 {
        self.grain_length
    }

    pub fn anti_alias_cutoff(&self) -> Option<f32> {
        self.anti_alias_enabled.then(|| self.anti_alias.cutoff())
    }
}
