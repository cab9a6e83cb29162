// Purpose: Voice management, polyphony, parameter snapshots
// This layer sits above the dsp primitives and wires them into voices

pub mod message;
pub mod params;
pub mod poly;
pub mod unison;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use params::{ParamId, ParamStore, SynthParams};
pub use poly::{VoicePool, VoiceSnapshot};
pub use voice::{Voice, VoiceState};
