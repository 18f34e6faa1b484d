//! The realtime engine: [`SamplePlayer`] on the audio thread, [`PlayerHandle`]
//! everywhere else.

mod handle;
mod player;
pub mod transport;

pub use handle::PlayerHandle;
pub use player::SamplePlayer;

use crate::sample::SampleStore;
use transport::Transport;

/// State reachable from both halves of the engine.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) transport: Transport,
    pub(crate) store: SampleStore,
}
