//! Low frequency modulation sources and the fixed routing table.

use crate::dsp::{
    smoother::LinearSmoother,
    waveform::{WaveformCore, Waveshape},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Modulation Sources
==================

An LFO is the same phase accumulator as an audio oscillator, run at control
rate (0-2 Hz here) and used to push offsets into other components instead
of being heard.

Vocabulary
----------

  amount        Scalar applied to the raw waveform. The host hands over the
                "Amount (%)" control value as-is, so a full-scale sine at
                100 % swings between -100 and +100 before routing.

  destination   Which single slot this source feeds. One of seven; the table
                is fixed, there is no patching.

  scale         Per-destination multiplier applied by the voice when it
                routes the source's value:

                  Osc AM / Osc PM      1x
                  Osc FM               5x   (±100 → ±500 Hz)
                  Filter cutoff        7x   (±100 → ±700 Hz)


Signal flow per sample
----------------------

    rate + rate_offset ──► WaveformCore.advance() ──► × amount
                                                          │
                                                          ▼
                                          LinearSmoother (10 ms ramp)
                                                          │
                                                          ▼
                                                       value()

The rate offset is single-sample-lived, like the oscillator offsets, so one
source can modulate another's rate by pushing every sample.

The smoother takes the edge off square waves and shape swaps. It also means
the output lags the raw waveform slightly; at 0-2 Hz that lag is inaudible.
*/

/// Ramp length of the output smoother.
pub const SMOOTHING_SECONDS: f32 = 0.01;

/// Where a modulation source sends its value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulationDestination {
    Osc1Am,
    Osc2Am,
    Osc1Fm,
    Osc2Fm,
    Osc1Pm,
    Osc2Pm,
    FilterCutoff,
}

/// Which transient offset of an oscillator a destination writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSlot {
    Frequency,
    Phase,
    Amplitude,
}

/// Concrete component a destination resolves to inside a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulationTarget {
    Oscillator { index: usize, slot: OffsetSlot },
    FilterCutoff,
}

impl ModulationDestination {
    pub const ALL: [ModulationDestination; 7] = [
        ModulationDestination::Osc1Am,
        ModulationDestination::Osc2Am,
        ModulationDestination::Osc1Fm,
        ModulationDestination::Osc2Fm,
        ModulationDestination::Osc1Pm,
        ModulationDestination::Osc2Pm,
        ModulationDestination::FilterCutoff,
    ];

    /// Resolve a host selector; unknown ids route nowhere.
    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn id(self) -> i32 {
        match self {
            ModulationDestination::Osc1Am => 0,
            ModulationDestination::Osc2Am => 1,
            ModulationDestination::Osc1Fm => 2,
            ModulationDestination::Osc2Fm => 3,
            ModulationDestination::Osc1Pm => 4,
            ModulationDestination::Osc2Pm => 5,
            ModulationDestination::FilterCutoff => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModulationDestination::Osc1Am => "Osc1:AM",
            ModulationDestination::Osc2Am => "Osc2:AM",
            ModulationDestination::Osc1Fm => "Osc1:FM",
            ModulationDestination::Osc2Fm => "Osc2:FM",
            ModulationDestination::Osc1Pm => "Osc1:PM",
            ModulationDestination::Osc2Pm => "Osc2:PM",
            ModulationDestination::FilterCutoff => "FilterCutoffFreq",
        }
    }

    /// Multiplier applied to a source's value before it reaches the target.
    pub fn scale(self) -> f32 {
        match self {
            ModulationDestination::Osc1Am
            | ModulationDestination::Osc2Am
            | ModulationDestination::Osc1Pm
            | ModulationDestination::Osc2Pm => 1.0,
            ModulationDestination::Osc1Fm | ModulationDestination::Osc2Fm => 5.0,
            ModulationDestination::FilterCutoff => 7.0,
        }
    }

    /// PM destinations land in the amplitude slot, same as AM. Patches have
    /// been voiced against that routing, so it stays until PM gets its own
    /// implementation.
    pub fn target(self) -> ModulationTarget {
        match self {
            ModulationDestination::Osc1Am | ModulationDestination::Osc1Pm => {
                ModulationTarget::Oscillator {
                    index: 0,
                    slot: OffsetSlot::Amplitude,
                }
            }
            ModulationDestination::Osc2Am | ModulationDestination::Osc2Pm => {
                ModulationTarget::Oscillator {
                    index: 1,
                    slot: OffsetSlot::Amplitude,
                }
            }
            ModulationDestination::Osc1Fm => ModulationTarget::Oscillator {
                index: 0,
                slot: OffsetSlot::Frequency,
            },
            ModulationDestination::Osc2Fm => ModulationTarget::Oscillator {
                index: 1,
                slot: OffsetSlot::Frequency,
            },
            ModulationDestination::FilterCutoff => ModulationTarget::FilterCutoff,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModulationSource {
    core: WaveformCore,
    frequency: f32,
    frequency_offset: f32,
    amount: f32,
    smoother: LinearSmoother,
    value: f32,
}

impl ModulationSource {
    pub fn new() -> Self {
        Self {
            core: WaveformCore::new(Waveshape::Sine),
            frequency: 0.0,
            frequency_offset: 0.0,
            amount: 0.0,
            smoother: LinearSmoother::new(),
            value: 0.0,
        }
    }

    /// Seed for a new note. The cycle restarts from phase zero and the
    /// smoothed output from 0.
    pub fn start_note(&mut self, sample_rate: f32, shape: Waveshape, frequency: f32, amount: f32) {
        self.set_sample_rate(sample_rate);
        self.core.set_phase(0.0);
        self.set_waveshape(shape);
        self.set_frequency(frequency);
        self.set_amount(amount);
        self.frequency_offset = 0.0;
        self.smoother.set_current_and_target(0.0);
        self.value = 0.0;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.core.set_sample_rate(sample_rate);
        self.smoother.reset(sample_rate, SMOOTHING_SECONDS);
    }

    pub fn set_waveshape(&mut self, shape: Waveshape) {
        self.core.set_waveshape(shape);
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.core.set_frequency(frequency);
    }

    /// Rate modulation for the next sample only. Contributions add.
    pub fn add_frequency_offset(&mut self, offset: f32) {
        self.frequency_offset += offset;
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = amount;
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.core.set_phase(phase);
    }

    /// Advance one sample and return the smoothed, scaled output.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let frequency = (self.frequency + self.frequency_offset).max(0.0);
        self.core.set_frequency(frequency);
        self.frequency_offset = 0.0;

        let raw = self.core.advance();
        self.smoother.set_target(self.amount * raw);
        self.value = self.smoother.next_value();
        self.value
    }

    /// Does a source configured with `destination_id` feed `destination`?
    ///
    /// Queried by the voice once per destination per sample.
    #[inline]
    pub fn is_applied_to(destination_id: i32, destination: ModulationDestination) -> bool {
        destination_id == destination.id()
    }

    /// Output of the most recent `process()` call.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn frequency_offset(&self) -> f32 {
        self.frequency_offset
    }

    pub fn waveshape(&self) -> Waveshape {
        self.core.waveform().shape()
    }
}

impl Default for ModulationSource {
    fn default() -> Self {
        Self::new()
    }
}
