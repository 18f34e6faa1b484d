use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::Shared;
use crate::error::LoadError;
use crate::synth::PlaybackMode;

/// Control-thread side of a [`SamplePlayer`](crate::engine::SamplePlayer).
///
/// Cheap to clone and safe to share. Every setter is a single atomic store
/// (or an atomic buffer swap for loads), so none of them can stall the audio
/// thread.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    shared: Arc<Shared>,
}

impl PlayerHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Replace the active sample with decoded planar `channels`.
    ///
    /// Voices playing the previous sample are reset on the next block. If the
    /// buffer is rejected the previous sample stays loaded.
    pub fn load_sample(&self, channels: Vec<Vec<f32>>, sample_rate: f64) -> Result<(), LoadError> {
        self.shared.store.load(channels, sample_rate)
    }

    /// Unload the active sample. Output goes silent on the next block.
    pub fn clear_sample(&self) {
        info!("Sample cleared");
        self.shared.store.clear();
    }

    pub fn set_playback_speed(&self, speed: f32) {
        match self.shared.transport.set_speed(speed) {
            Some(applied) => debug!(requested = speed, applied, "Playback speed"),
            None => debug!(requested = speed, "Ignored non-finite playback speed"),
        }
    }

    pub fn set_looping(&self, looping: bool) {
        debug!(looping, "Looping");
        self.shared.transport.set_looping(looping);
    }

    pub fn set_hold_mode(&self, hold: bool) {
        debug!(hold, "Hold mode");
        self.shared.transport.set_hold(hold);
    }

    /// Normalised 0..=1 position in the sample.
    pub fn set_hold_position(&self, position: f64) {
        let applied = self.shared.transport.set_hold_position(position);
        debug!(position = applied, "Hold position");
    }

    pub fn set_playback_mode(&self, mode: PlaybackMode) {
        debug!(mode = mode.name(), "Playback mode");
        self.shared.transport.set_mode(mode);
    }

    /// When disabled the player leaves its output untouched.
    pub fn set_enabled(&self, enabled: bool) {
        debug!(enabled, "Player enabled");
        self.shared.transport.set_enabled(enabled);
    }

    /// Fade out every voice on the next block.
    pub fn stop_all_voices(&self) {
        debug!("Stop all voices");
        self.shared.transport.request_stop();
    }

    pub fn playback_speed(&self) -> f32 {
        self.shared.transport.speed()
    }

    pub fn is_looping(&self) -> bool {
        self.shared.transport.looping()
    }

    pub fn is_hold_mode(&self) -> bool {
        self.shared.transport.hold()
    }

    pub fn hold_position(&self) -> f64 {
        self.shared.transport.hold_position()
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.shared.transport.mode()
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.transport.enabled()
    }

    /// Peak of the last rendered block, 0..=1.
    pub fn current_level(&self) -> f32 {
        self.shared.transport.level()
    }

    /// Normalised read position of the lead voice, 0 when nothing plays.
    pub fn current_position(&self) -> f64 {
        self.shared.transport.position()
    }

    pub fn active_voice_count(&self) -> usize {
        self.shared.transport.active_voices()
    }

    pub fn is_file_loaded(&self) -> bool {
        self.shared.store.is_loaded()
    }

    pub fn length_in_seconds(&self) -> f64 {
        self.shared.store.length_in_seconds()
    }
}
