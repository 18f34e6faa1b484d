// Purpose: note handling on top of the DSP primitives
// Grains make up voices, voices make up the pool the engine drives

pub mod grain;
pub mod message;
pub mod pool;
pub mod voice;

pub use message::{MessageReceiver, MidiMessage};
pub use pool::{PlaybackMode, VoicePool};
pub use voice::{pitch_ratio, RenderCtx, Voice};
