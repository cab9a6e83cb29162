//! Synth parameters: the per-block snapshot the voices read, and the
//! lock-free store the control thread writes into.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::{dsp::envelope::AdsrParams, EngineError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Control plane → audio thread
============================

    UI / automation thread                 audio callback
    ──────────────────────                 ──────────────
    store.set(ParamId::CutOff, 400.0)
              │
              ▼
    [AtomicU32; 29]  (f32 bit patterns) ──► store.snapshot() once per block
                                                  │
                                                  ▼
                                            SynthParams (Copy)
                                                  │
                                                  ▼
                                     VoicePool::render_block(out, &params)

Every parameter is its own atomic word, so a single value is never observed
half-written. Nothing ties two parameters together: a snapshot taken while
the UI is moving the cutoff and the resonance may see the new cutoff with
the old resonance. At one snapshot per block that is inaudible.

Integer and boolean parameters travel as floats too; `set` rounds stepped
parameters so the snapshot never sees 2.5 for a waveshape id.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    /// 0 sine, 1 triangle, 2 saw, 3 square; anything else plays sine.
    pub waveshape: i32,
    /// Extra detuned copies, 0..=7.
    pub unison: usize,
    /// Detune spread in percent, 0..=100.
    pub detune: f32,
    pub level: f32,
}

impl OscillatorParams {
    const fn with_detune(detune: f32) -> Self {
        Self {
            waveshape: 0,
            unison: 0,
            detune,
            level: 0.5,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub enabled: bool,
    /// 0 lowpass, 1 highpass, 2 bandpass; anything else passes through.
    pub filter_type: i32,
    pub cutoff: f32,
    pub resonance: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            enabled: false,
            filter_type: 0,
            cutoff: 120.0,
            resonance: 0.2,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    pub waveshape: i32,
    /// Destination id 0..=6, see `ModulationDestination`.
    pub destination: i32,
    /// Hz.
    pub rate: f32,
    /// Percent, 0..=100, used unscaled as the output multiplier.
    pub amount: f32,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            waveshape: 0,
            destination: 0,
            rate: 1.0,
            amount: 0.0,
        }
    }
}

/// Everything a voice needs for one block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub oscillators: [OscillatorParams; 2],
    pub envelopes: [AdsrParams; 2],
    pub filter: FilterParams,
    pub lfos: [LfoParams; 2],
    pub reverb: bool,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            oscillators: [
                OscillatorParams::with_detune(20.0),
                OscillatorParams::with_detune(30.0),
            ],
            envelopes: [AdsrParams::default(); 2],
            filter: FilterParams::default(),
            lfos: [LfoParams::default(); 2],
            reverb: false,
        }
    }
}

/// Bounds and default of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Integer-valued (selectors, counts, switches).
    pub stepped: bool,
}

impl ParamRange {
    const fn continuous(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            stepped: false,
        }
    }

    const fn stepped(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            stepped: true,
        }
    }

    const fn toggle() -> Self {
        Self::stepped(0.0, 1.0, 0.0)
    }

    pub fn clamp(&self, value: f32) -> f32 {
        let value = if value.is_nan() { self.default } else { value };
        let value = value.clamp(self.min, self.max);
        if self.stepped {
            value.round()
        } else {
            value
        }
    }

    /// Increment used by coarse editors: one step for stepped parameters,
    /// a hundredth of the span otherwise.
    pub fn step(&self) -> f32 {
        if self.stepped {
            1.0
        } else {
            (self.max - self.min) / 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Osc1Waveshape,
    Osc1Unison,
    Osc1Detune,
    Level1,
    Attack1,
    Decay1,
    Sustain1,
    Release1,
    Osc2Waveshape,
    Osc2Unison,
    Osc2Detune,
    Level2,
    Attack2,
    Decay2,
    Sustain2,
    Release2,
    Reverb,
    FilterOn,
    FilterType,
    CutOff,
    Q,
    Lfo1Waveshape,
    Lfo1Destination,
    Lfo1Freq,
    Lfo1Amount,
    Lfo2Waveshape,
    Lfo2Destination,
    Lfo2Freq,
    Lfo2Amount,
}

/// Which field of `SynthParams` a `ParamId` addresses. The index selects
/// the oscillator, envelope or LFO where there are two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Waveshape(usize),
    Unison(usize),
    Detune(usize),
    Level(usize),
    Attack(usize),
    Decay(usize),
    Sustain(usize),
    Release(usize),
    Reverb,
    FilterOn,
    FilterType,
    Cutoff,
    Resonance,
    LfoWaveshape(usize),
    LfoDestination(usize),
    LfoRate(usize),
    LfoAmount(usize),
}

impl ParamId {
    pub const COUNT: usize = 29;

    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::Osc1Waveshape,
        ParamId::Osc1Unison,
        ParamId::Osc1Detune,
        ParamId::Level1,
        ParamId::Attack1,
        ParamId::Decay1,
        ParamId::Sustain1,
        ParamId::Release1,
        ParamId::Osc2Waveshape,
        ParamId::Osc2Unison,
        ParamId::Osc2Detune,
        ParamId::Level2,
        ParamId::Attack2,
        ParamId::Decay2,
        ParamId::Sustain2,
        ParamId::Release2,
        ParamId::Reverb,
        ParamId::FilterOn,
        ParamId::FilterType,
        ParamId::CutOff,
        ParamId::Q,
        ParamId::Lfo1Waveshape,
        ParamId::Lfo1Destination,
        ParamId::Lfo1Freq,
        ParamId::Lfo1Amount,
        ParamId::Lfo2Waveshape,
        ParamId::Lfo2Destination,
        ParamId::Lfo2Freq,
        ParamId::Lfo2Amount,
    ];

    /// Position in `ALL` and in the store.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable host-facing identifier.
    pub fn id(self) -> &'static str {
        match self {
            ParamId::Osc1Waveshape => "Osc1Waveshape",
            ParamId::Osc1Unison => "Osc1Unison",
            ParamId::Osc1Detune => "Osc1Detune",
            ParamId::Level1 => "level1",
            ParamId::Attack1 => "attack1",
            ParamId::Decay1 => "decay1",
            ParamId::Sustain1 => "sustain1",
            ParamId::Release1 => "release1",
            ParamId::Osc2Waveshape => "Osc2Waveshape",
            ParamId::Osc2Unison => "Osc2Unison",
            ParamId::Osc2Detune => "Osc2Detune",
            ParamId::Level2 => "level2",
            ParamId::Attack2 => "attack2",
            ParamId::Decay2 => "decay2",
            ParamId::Sustain2 => "sustain2",
            ParamId::Release2 => "release2",
            ParamId::Reverb => "Reverb",
            ParamId::FilterOn => "FilterOn",
            ParamId::FilterType => "filterType",
            ParamId::CutOff => "cutOff",
            ParamId::Q => "Q",
            ParamId::Lfo1Waveshape => "LFO1Waveshape",
            ParamId::Lfo1Destination => "LFO1Destination",
            ParamId::Lfo1Freq => "LFO1FreqParam",
            ParamId::Lfo1Amount => "LFO1AmountParam",
            ParamId::Lfo2Waveshape => "LFO2Waveshape",
            ParamId::Lfo2Destination => "LFO2Destination",
            ParamId::Lfo2Freq => "LFO2FreqParam",
            ParamId::Lfo2Amount => "LFO2AmountParam",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|param| param.id() == id)
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self.field() {
            Field::Waveshape(0) => "Osc 1 Waveshape",
            Field::Waveshape(_) => "Osc 2 Waveshape",
            Field::Unison(0) => "Osc 1 Unison",
            Field::Unison(_) => "Osc 2 Unison",
            Field::Detune(0) => "Osc 1 Detune (%)",
            Field::Detune(_) => "Osc 2 Detune (%)",
            Field::Level(0) => "Osc 1 Level",
            Field::Level(_) => "Osc 2 Level",
            Field::Attack(0) => "Env 1 Attack (s)",
            Field::Attack(_) => "Env 2 Attack (s)",
            Field::Decay(0) => "Env 1 Decay (s)",
            Field::Decay(_) => "Env 2 Decay (s)",
            Field::Sustain(0) => "Env 1 Sustain",
            Field::Sustain(_) => "Env 2 Sustain",
            Field::Release(0) => "Env 1 Release (s)",
            Field::Release(_) => "Env 2 Release (s)",
            Field::Reverb => "Reverb",
            Field::FilterOn => "Filter On",
            Field::FilterType => "Filter Type",
            Field::Cutoff => "Cutoff (Hz)",
            Field::Resonance => "Resonance",
            Field::LfoWaveshape(0) => "LFO 1 Waveshape",
            Field::LfoWaveshape(_) => "LFO 2 Waveshape",
            Field::LfoDestination(0) => "LFO 1 Destination",
            Field::LfoDestination(_) => "LFO 2 Destination",
            Field::LfoRate(0) => "LFO 1 Rate (Hz)",
            Field::LfoRate(_) => "LFO 2 Rate (Hz)",
            Field::LfoAmount(0) => "LFO 1 Amount (%)",
            Field::LfoAmount(_) => "LFO 2 Amount (%)",
        }
    }

    pub fn range(self) -> ParamRange {
        match self.field() {
            Field::Waveshape(_) | Field::LfoWaveshape(_) => ParamRange::stepped(0.0, 3.0, 0.0),
            Field::Unison(_) => ParamRange::stepped(0.0, crate::MAX_UNISON as f32, 0.0),
            Field::Detune(0) => ParamRange::continuous(0.0, 100.0, 20.0),
            Field::Detune(_) => ParamRange::continuous(0.0, 100.0, 30.0),
            Field::Level(_) => ParamRange::continuous(0.0, 1.0, 0.5),
            Field::Attack(_) => ParamRange::continuous(0.1, 5.0, 1.0),
            Field::Decay(_) => ParamRange::continuous(0.0, 5.0, 0.5),
            Field::Sustain(_) => ParamRange::continuous(0.0, 1.0, 0.4),
            Field::Release(_) => ParamRange::continuous(0.0, 5.0, 0.5),
            Field::Reverb | Field::FilterOn => ParamRange::toggle(),
            Field::FilterType => ParamRange::stepped(0.0, 2.0, 0.0),
            Field::Cutoff => ParamRange::continuous(100.0, 1_000.0, 120.0),
            Field::Resonance => ParamRange::continuous(0.0, 1.0, 0.2),
            Field::LfoDestination(_) => ParamRange::stepped(0.0, 6.0, 0.0),
            Field::LfoRate(_) => ParamRange::continuous(0.0, 2.0, 1.0),
            Field::LfoAmount(_) => ParamRange::continuous(0.0, 100.0, 0.0),
        }
    }

    fn field(self) -> Field {
        match self {
            ParamId::Osc1Waveshape => Field::Waveshape(0),
            ParamId::Osc1Unison => Field::Unison(0),
            ParamId::Osc1Detune => Field::Detune(0),
            ParamId::Level1 => Field::Level(0),
            ParamId::Attack1 => Field::Attack(0),
            ParamId::Decay1 => Field::Decay(0),
            ParamId::Sustain1 => Field::Sustain(0),
            ParamId::Release1 => Field::Release(0),
            ParamId::Osc2Waveshape => Field::Waveshape(1),
            ParamId::Osc2Unison => Field::Unison(1),
            ParamId::Osc2Detune => Field::Detune(1),
            ParamId::Level2 => Field::Level(1),
            ParamId::Attack2 => Field::Attack(1),
            ParamId::Decay2 => Field::Decay(1),
            ParamId::Sustain2 => Field::Sustain(1),
            ParamId::Release2 => Field::Release(1),
            ParamId::Reverb => Field::Reverb,
            ParamId::FilterOn => Field::FilterOn,
            ParamId::FilterType => Field::FilterType,
            ParamId::CutOff => Field::Cutoff,
            ParamId::Q => Field::Resonance,
            ParamId::Lfo1Waveshape => Field::LfoWaveshape(0),
            ParamId::Lfo1Destination => Field::LfoDestination(0),
            ParamId::Lfo1Freq => Field::LfoRate(0),
            ParamId::Lfo1Amount => Field::LfoAmount(0),
            ParamId::Lfo2Waveshape => Field::LfoWaveshape(1),
            ParamId::Lfo2Destination => Field::LfoDestination(1),
            ParamId::Lfo2Freq => Field::LfoRate(1),
            ParamId::Lfo2Amount => Field::LfoAmount(1),
        }
    }
}

fn flag(value: f32) -> bool {
    value >= 0.5
}

impl SynthParams {
    /// Read one parameter as the float a host would see.
    pub fn value(&self, id: ParamId) -> f32 {
        match id.field() {
            Field::Waveshape(i) => self.oscillators[i].waveshape as f32,
            Field::Unison(i) => self.oscillators[i].unison as f32,
            Field::Detune(i) => self.oscillators[i].detune,
            Field::Level(i) => self.oscillators[i].level,
            Field::Attack(i) => self.envelopes[i].attack,
            Field::Decay(i) => self.envelopes[i].decay,
            Field::Sustain(i) => self.envelopes[i].sustain,
            Field::Release(i) => self.envelopes[i].release,
            Field::Reverb => f32::from(u8::from(self.reverb)),
            Field::FilterOn => f32::from(u8::from(self.filter.enabled)),
            Field::FilterType => self.filter.filter_type as f32,
            Field::Cutoff => self.filter.cutoff,
            Field::Resonance => self.filter.resonance,
            Field::LfoWaveshape(i) => self.lfos[i].waveshape as f32,
            Field::LfoDestination(i) => self.lfos[i].destination as f32,
            Field::LfoRate(i) => self.lfos[i].rate,
            Field::LfoAmount(i) => self.lfos[i].amount,
        }
    }

    /// Write one parameter. No range clamping happens here; integer fields
    /// take the rounded value.
    pub fn set_value(&mut self, id: ParamId, value: f32) {
        let int = value.round() as i32;
        match id.field() {
            Field::Waveshape(i) => self.oscillators[i].waveshape = int,
            Field::Unison(i) => self.oscillators[i].unison = int.max(0) as usize,
            Field::Detune(i) => self.oscillators[i].detune = value,
            Field::Level(i) => self.oscillators[i].level = value,
            Field::Attack(i) => self.envelopes[i].attack = value,
            Field::Decay(i) => self.envelopes[i].decay = value,
            Field::Sustain(i) => self.envelopes[i].sustain = value,
            Field::Release(i) => self.envelopes[i].release = value,
            Field::Reverb => self.reverb = flag(value),
            Field::FilterOn => self.filter.enabled = flag(value),
            Field::FilterType => self.filter.filter_type = int,
            Field::Cutoff => self.filter.cutoff = value,
            Field::Resonance => self.filter.resonance = value,
            Field::LfoWaveshape(i) => self.lfos[i].waveshape = int,
            Field::LfoDestination(i) => self.lfos[i].destination = int,
            Field::LfoRate(i) => self.lfos[i].rate = value,
            Field::LfoAmount(i) => self.lfos[i].amount = value,
        }
    }
}

/// Lock-free parameter storage shared between the control and audio threads.
///
/// Wrap in an `Arc` to share; every method takes `&self`.
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicU32; ParamId::COUNT],
}

impl ParamStore {
    pub fn new() -> Self {
        Self::from_params(&SynthParams::default())
    }

    pub fn from_params(params: &SynthParams) -> Self {
        let store = Self {
            values: std::array::from_fn(|_| AtomicU32::new(0)),
        };
        store.store(params);
        store
    }

    /// Clamp to the parameter's range and publish. Returns the value stored.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let value = id.range().clamp(value);
        self.values[id.index()].store(value.to_bits(), Ordering::Relaxed);
        value
    }

    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    pub fn set_by_name(&self, name: &str, value: f32) -> Result<f32> {
        let id = ParamId::from_id(name).ok_or_else(|| EngineError::UnknownParameter {
            name: name.to_string(),
        })?;
        Ok(self.set(id, value))
    }

    /// Move a parameter by `steps` increments of its editor step.
    pub fn nudge(&self, id: ParamId, steps: f32) -> f32 {
        let range = id.range();
        self.set(id, self.get(id) + steps * range.step())
    }

    /// Publish every field of `params`, clamped.
    pub fn store(&self, params: &SynthParams) {
        for id in ParamId::ALL {
            self.set(id, params.value(id));
        }
    }

    /// Read every parameter once. Each value is atomic on its own.
    pub fn snapshot(&self) -> SynthParams {
        let mut params = SynthParams::default();
        for id in ParamId::ALL {
            params.set_value(id, self.get(id));
        }
        params
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}
