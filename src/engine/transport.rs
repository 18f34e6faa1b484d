use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use crate::synth::PlaybackMode;

pub const MIN_SPEED: f32 = 0.01;
pub const MAX_SPEED: f32 = 8.0;

/// `f32` stored as its bit pattern.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// `f64` stored as its bit pattern.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Transport flags and meters shared between the control and audio threads.
///
/// Each field has exactly one writer. The control thread owns the settings,
/// the audio thread owns the meters. Every value is a single atomic scalar,
/// so a reader sees the latest complete value and never blocks.
#[derive(Debug)]
pub struct Transport {
    // written by the control thread
    speed: AtomicF32,
    looping: AtomicBool,
    hold: AtomicBool,
    hold_position: AtomicF64,
    mode: AtomicU8,
    enabled: AtomicBool,
    stop_requests: AtomicU64,

    // written by the audio thread
    level: AtomicF32,
    position: AtomicF64,
    active_voices: AtomicUsize,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            speed: AtomicF32::new(1.0),
            looping: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            hold_position: AtomicF64::new(0.0),
            mode: AtomicU8::new(PlaybackMode::default() as u8),
            enabled: AtomicBool::new(true),
            stop_requests: AtomicU64::new(0),

            level: AtomicF32::new(0.0),
            position: AtomicF64::new(0.0),
            active_voices: AtomicUsize::new(0),
        }
    }

    /// Clamped to [`MIN_SPEED`, `MAX_SPEED`]. Non-finite values are ignored.
    pub fn set_speed(&self, speed: f32) -> Option<f32> {
        if !speed.is_finite() {
            return None;
        }
        let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.speed.store(speed);
        Some(speed)
    }

    pub fn speed(&self) -> f32 {
        self.speed.load()
    }

    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::Relaxed);
    }

    pub fn looping(&self) -> bool {
        self.looping.load(Ordering::Relaxed)
    }

    pub fn set_hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::Relaxed);
    }

    pub fn hold(&self) -> bool {
        self.hold.load(Ordering::Relaxed)
    }

    /// Normalised to [0, 1]. NaN maps to 0.
    pub fn set_hold_position(&self, position: f64) -> f64 {
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        self.hold_position.store(position);
        position
    }

    pub fn hold_position(&self) -> f64 {
        self.hold_position.load()
    }

    pub fn set_mode(&self, mode: PlaybackMode) {
        self.mode.store(mode as u8, Ordering::Relaxed);
    }

    pub fn mode(&self) -> PlaybackMode {
        PlaybackMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop_requests.fetch_add(1, Ordering::Release);
    }

    /// Monotonic count of stop requests. The audio thread compares it with
    /// the last value it acted on.
    pub fn stop_requests(&self) -> u64 {
        self.stop_requests.load(Ordering::Acquire)
    }

    pub fn publish_meters(&self, level: f32, position: f64, active_voices: usize) {
        self.level.store(level);
        self.position.store(position);
        self.active_voices.store(active_voices, Ordering::Relaxed);
    }

    pub fn level(&self) -> f32 {
        self.level.load()
    }

    pub fn position(&self) -> f64 {
        self.position.load()
    }

    pub fn active_voices(&self) -> usize {
        self.active_voices.load(Ordering::Relaxed)
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
