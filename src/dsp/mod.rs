//! Low-level DSP primitives used by the voice.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; routing and mixing live in `synth`.

/// Attack/decay/sustain/release envelope contract and linear implementation.
pub mod envelope;
/// Resonant state-variable filter with a per-sample modulatable cutoff.
pub mod filter;
/// Low-frequency modulation sources and destination routing.
pub mod lfo;
/// Oscillator with single-sample frequency/phase/amplitude offsets.
pub mod oscillator;
/// Schroeder reverb and the fixed-setting send.
pub mod reverb;
pub mod smoother;
/// Phase accumulator and the four waveform shapes.
pub mod waveform;

pub use envelope::{Adsr, AdsrParams, EnvelopeGenerator, EnvelopeState};
pub use filter::{FilterType, ResonantFilter};
pub use lfo::{ModulationDestination, ModulationSource};
pub use oscillator::{ModulatableOscillator, ModulationOffsets};
pub use waveform::{Waveform, WaveformCore, Waveshape};
