pub mod dsp; // Oscillators, modulation sources, filter, envelopes
pub mod error;
pub mod io;
pub mod synth; // Voice management and polyphony

pub use error::{EngineError, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Extra detuned copies an oscillator chain can stack on top of its primary.
pub const MAX_UNISON: usize = 7;

/// Fixed attenuation applied to every voice before it reaches the output bus.
pub const OUTPUT_HEADROOM: f32 = 0.1;

pub const DEFAULT_VOICE_COUNT: usize = 4;
