use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

Every oscillator in the engine is the same machine: a phase that ramps from
0 to 1 once per cycle, and a shape function that turns the phase into an
amplitude.

    phase_delta = frequency / sample_rate

    each sample:
        phase += phase_delta
        if phase >= 1.0 { phase -= 1.0 }    (wrap, phase stays in [0, 1))
        output = shape(phase)

Shapes
------

  phase  0 ─────────────── 0.5 ─────────────── 1

  Sine      sin(2π·p)                     [-1, 1]
  Triangle  |p - 0.5| - 0.5               [-0.5, 0]   (V shaped dip)
  Saw       p / π                         [0, 1/π)    (legacy scale)
  Square    +0.5 while p <= width,        {-0.5, 0.5}
            -0.5 after

The saw and triangle scalings are kept exactly as the instrument has always
produced them: presets were voiced against these levels, so changing them
changes every patch's mix.

Note that the wave is read AFTER the phase advances, so the very first
sample of a freshly started oscillator is shape(phase_delta), not shape(0).
*/

/// Closed set of oscillator shapes, addressed by a stable integer id.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveshape {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

impl Waveshape {
    pub const ALL: [Waveshape; 4] = [
        Waveshape::Sine,
        Waveshape::Triangle,
        Waveshape::Saw,
        Waveshape::Square,
    ];

    /// Resolve a host selector. Unknown ids fall back to `Sine`.
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => Waveshape::Triangle,
            2 => Waveshape::Saw,
            3 => Waveshape::Square,
            _ => Waveshape::Sine,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Waveshape::Sine => 0,
            Waveshape::Triangle => 1,
            Waveshape::Saw => 2,
            Waveshape::Square => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveshape::Sine => "Sine",
            Waveshape::Triangle => "Triangle",
            Waveshape::Saw => "Saw",
            Waveshape::Square => "Square",
        }
    }
}

pub const DEFAULT_PULSE_WIDTH: f32 = 0.5;

/// A shape plus whatever per-shape state it carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Saw,
    Square { pulse_width: f32 },
}

impl Waveform {
    pub fn new(shape: Waveshape) -> Self {
        match shape {
            Waveshape::Sine => Waveform::Sine,
            Waveshape::Triangle => Waveform::Triangle,
            Waveshape::Saw => Waveform::Saw,
            Waveshape::Square => Waveform::Square {
                pulse_width: DEFAULT_PULSE_WIDTH,
            },
        }
    }

    pub fn shape(&self) -> Waveshape {
        match self {
            Waveform::Sine => Waveshape::Sine,
            Waveform::Triangle => Waveshape::Triangle,
            Waveform::Saw => Waveshape::Saw,
            Waveform::Square { .. } => Waveshape::Square,
        }
    }

    /// Map a normalized phase in [0, 1) to an amplitude.
    #[inline]
    pub fn output(&self, phase: f32) -> f32 {
        match *self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => (phase - 0.5).abs() - 0.5,
            Waveform::Saw => phase / PI,
            Waveform::Square { pulse_width } => {
                if phase > pulse_width {
                    -0.5
                } else {
                    0.5
                }
            }
        }
    }
}

/// Phase accumulator driving one [`Waveform`].
#[derive(Debug, Clone)]
pub struct WaveformCore {
    waveform: Waveform,
    sample_rate: f32,
    frequency: f32,
    // Accumulated in f64 so long notes do not drift against an ideal cycle.
    phase: f64,
    phase_delta: f64,
}

impl WaveformCore {
    pub fn new(shape: Waveshape) -> Self {
        Self {
            waveform: Waveform::new(shape),
            sample_rate: 48_000.0,
            frequency: 0.0,
            phase: 0.0,
            phase_delta: 0.0,
        }
    }

    /// Sample rate must be > 0; validate with [`crate::error::validate_sample_rate`]
    /// before the render path.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.phase_delta = self.frequency as f64 / self.sample_rate as f64;
    }

    /// Frequency in Hz. Negative values are a caller bug.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        debug_assert!(frequency >= 0.0, "negative frequency: {frequency}");
        self.frequency = frequency;
        self.phase_delta = frequency as f64 / self.sample_rate as f64;
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.phase = (phase as f64).rem_euclid(1.0);
    }

    /// Swap the shape. Phase, frequency and sample rate carry over; shape
    /// specific state (pulse width) starts from its default.
    pub fn set_waveshape(&mut self, shape: Waveshape) {
        self.waveform = Waveform::new(shape);
    }

    /// Only meaningful for the square shape; ignored otherwise.
    pub fn set_pulse_width(&mut self, width: f32) {
        if let Waveform::Square { pulse_width } = &mut self.waveform {
            *pulse_width = width.clamp(0.0, 1.0);
        }
    }

    /// Step the phase by one sample and return the new amplitude.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.phase += self.phase_delta;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        self.waveform.output(self.phase as f32)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn phase(&self) -> f32 {
        self.phase as f32
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl Default for WaveformCore {
    fn default() -> Self {
        Self::new(Waveshape::Sine)
    }
}
