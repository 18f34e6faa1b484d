use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwapOption, Guard};
use tracing::{info, warn};

use crate::error::LoadError;
use crate::sample::SampleBuffer;

/// Single-writer publication point for the active [`SampleBuffer`].
///
/// The control thread builds and conditions a complete buffer, then swaps the
/// pointer in one atomic step. The audio thread loads the pointer once per
/// block, so it sees either the old buffer or the new one, never a partial
/// write. A generation counter lets the audio thread notice a swap without
/// holding on to the previous `Arc`.
pub struct SampleStore {
    current: ArcSwapOption<SampleBuffer>,
    generation: AtomicU64,
}

impl SampleStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Condition `channels` and publish them. On error the current buffer is
    /// kept.
    pub fn load(&self, channels: Vec<Vec<f32>>, sample_rate: f64) -> Result<(), LoadError> {
        let buffer = SampleBuffer::from_decoded(channels, sample_rate).map_err(|err| {
            warn!(%err, "Rejected sample buffer, keeping previous sample");
            err
        })?;

        info!(
            frames = buffer.len(),
            channels = buffer.num_channels(),
            sample_rate = buffer.sample_rate(),
            gain = buffer.normalize_gain(),
            "Sample loaded"
        );
        self.publish(Some(Arc::new(buffer)));
        Ok(())
    }

    /// Drop the active sample.
    pub fn clear(&self) {
        self.publish(None);
    }

    fn publish(&self, buffer: Option<Arc<SampleBuffer>>) {
        // The previous buffer is released here, on the control thread.
        let previous = self.current.swap(buffer);
        self.generation.fetch_add(1, Ordering::Release);
        drop(previous);
    }

    /// Lock-free snapshot of the active buffer.
    #[inline]
    pub fn current(&self) -> Guard<Option<Arc<SampleBuffer>>> {
        self.current.load()
    }

    /// Bumped on every publish.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_loaded(&self) -> bool {
        match &*self.current() {
            Some(buffer) => !buffer.is_empty(),
            None => false,
        }
    }

    pub fn length_in_seconds(&self) -> f64 {
        match &*self.current() {
            Some(buffer) => buffer.length_in_seconds(),
            None => 0.0,
        }
    }

    /// Frames in the active buffer, 0 when nothing is loaded.
    pub fn frames(&self) -> usize {
        match &*self.current() {
            Some(buffer) => buffer.len(),
            None => 0,
        }
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStore")
            .field("frames", &self.frames())
            .field("generation", &self.generation())
            .finish()
    }
}
