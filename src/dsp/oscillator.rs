use crate::dsp::waveform::{Waveform, WaveformCore, Waveshape};

/*
Modulatable Oscillator
======================

A WaveformCore plus three per-sample modulation inputs:

  frequency offset   Hz added to the base frequency for this sample
  phase offset       accepted, consumed, not applied to the output
  amplitude offset   accepted, consumed, not applied to the output

Modulation here is single-sample-lived. Anything pushed in through the
`add_*_offset` methods only affects the NEXT `process()` call, which then
clears all three offsets:

    sample n:   lfo → add_frequency_offset(5.0)
                process()   → renders at base + 5 Hz, offsets → 0
    sample n+1: (nobody pushes)
                process()   → renders at base

A modulation source therefore has to re-apply its value every sample for the
effect to persist. Several sources may push into the same slot within one
sample; their contributions add.

The frequency that reaches the phase accumulator is clamped at 0 Hz, so deep
negative FM stalls the oscillator instead of running it backwards.
*/

/// Transient additive modulation collected for the next sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModulationOffsets {
    pub frequency: f32,
    pub phase: f32,
    pub amplitude: f32,
}

impl ModulationOffsets {
    pub const ZERO: Self = Self {
        frequency: 0.0,
        phase: 0.0,
        amplitude: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModulatableOscillator {
    core: WaveformCore,
    base_frequency: f32,
    offsets: ModulationOffsets,
}

impl ModulatableOscillator {
    pub fn new(shape: Waveshape) -> Self {
        Self {
            core: WaveformCore::new(shape),
            base_frequency: 0.0,
            offsets: ModulationOffsets::ZERO,
        }
    }

    /// Seed for a new note: sample rate, shape and base frequency.
    ///
    /// The phase restarts at zero so every note begins from the same point
    /// of the cycle.
    pub fn start_note(&mut self, sample_rate: f32, shape: Waveshape, frequency: f32) {
        self.set_sample_rate(sample_rate);
        self.set_phase(0.0);
        self.set_waveshape(shape);
        self.set_frequency(frequency);
        self.set_base_frequency(frequency);
        self.offsets = ModulationOffsets::ZERO;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.core.set_sample_rate(sample_rate);
    }

    /// Swap the shape, continuing from the current phase.
    pub fn set_waveshape(&mut self, shape: Waveshape) {
        self.core.set_waveshape(shape);
    }

    pub fn set_pulse_width(&mut self, width: f32) {
        self.core.set_pulse_width(width);
    }

    /// Frequency the accumulator runs at until the next `process()`.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.core.set_frequency(frequency);
    }

    /// Frequency every `process()` starts from before offsets are added.
    pub fn set_base_frequency(&mut self, frequency: f32) {
        self.base_frequency = frequency;
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.core.set_phase(phase);
    }

    pub fn add_frequency_offset(&mut self, offset: f32) {
        self.offsets.frequency += offset;
    }

    pub fn add_phase_offset(&mut self, offset: f32) {
        self.offsets.phase += offset;
    }

    pub fn add_amplitude_offset(&mut self, offset: f32) {
        self.offsets.amplitude += offset;
    }

    /// Render one sample. Consumes and clears the pending offsets.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let frequency = (self.base_frequency + self.offsets.frequency).max(0.0);
        self.core.set_frequency(frequency);
        self.offsets = ModulationOffsets::ZERO;
        self.core.advance()
    }

    pub fn offsets(&self) -> ModulationOffsets {
        self.offsets
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Frequency used for the most recent sample.
    pub fn frequency(&self) -> f32 {
        self.core.frequency()
    }

    pub fn phase(&self) -> f32 {
        self.core.phase()
    }

    pub fn waveform(&self) -> Waveform {
        self.core.waveform()
    }
}
