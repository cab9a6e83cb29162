use crate::{
    dsp::{
        envelope::{Adsr, EnvelopeGenerator},
        filter::{FilterType, ResonantFilter},
        lfo::{ModulationDestination, ModulationSource, ModulationTarget, OffsetSlot},
        waveform::Waveshape,
    },
    error::{validate_frequency, validate_sample_rate, Result},
    io::converter::midi_note_to_freq,
    synth::{params::SynthParams, unison::UnisonStack},
    OUTPUT_HEADROOM,
};

/*
Voice
=====

One note's worth of signal path. Everything is owned, preallocated, and
re-seeded by `start_note`; nothing is created per note.

    chain 1 (primary + unison) ─┐          env 1 × level 1
                                ├─► mix ──────────────────────► filter? ─► × 0.1 ─► every channel
    chain 2 (primary + unison) ─┘          env 2 × level 2
            ▲                                                     ▲
            │ freq / amp offsets                                  │ cutoff offset
            └──────────────── LFO 1, LFO 2 ───────────────────────┘

Per sample, in this order:

    1. unison members of both chains render and are summed
    2. both LFOs advance once
    3. every LFO whose destination matches pushes value × scale into the
       destination's offset slot (several LFOs on one slot add up)
    4. primaries render, consuming the offsets from step 3
    5. each chain is normalized: (primary + unison) / (unison + 1)
    6. mix = env1·level1·chain1 + env2·level2·chain2
    7. filter, when enabled, consuming the cutoff offset from step 3
    8. × OUTPUT_HEADROOM, added to every output channel
    9. both envelopes idle → the voice goes Idle and stops rendering

Modulation is always applied in the same sample it was computed; the
offsets never carry over.

What is latched at note start and what follows the live snapshot:

    latched   waveshapes, unison count and detune, ADSR times, filter base
              cutoff and resonance, LFO shape, rate and amount
    live      oscillator levels, filter on/off and type, LFO destinations
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Active,    // Note held
    Releasing, // Note released, envelopes in their release stage
}

/// A single polyphonic voice.
#[derive(Debug, Clone)]
pub struct Voice<E: EnvelopeGenerator = Adsr> {
    note: u8,
    velocity: u8,
    state: VoiceState,
    age: u64,
    sample_rate: f32,

    chains: [UnisonStack; 2],
    lfos: [ModulationSource; 2],
    filter: ResonantFilter,
    envelopes: [E; 2],
}

impl Voice<Adsr> {
    pub fn new(sample_rate: f32) -> Result<Self> {
        Self::with_envelopes(sample_rate, [Adsr::new(), Adsr::new()])
    }
}

impl<E: EnvelopeGenerator> Voice<E> {
    /// Build a voice around caller-supplied envelope generators.
    pub fn with_envelopes(sample_rate: f32, envelopes: [E; 2]) -> Result<Self> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        Ok(Self {
            note: 0,
            velocity: 0,
            state: VoiceState::Idle,
            age: 0,
            sample_rate,
            chains: [UnisonStack::new(), UnisonStack::new()],
            lfos: [ModulationSource::new(), ModulationSource::new()],
            filter: ResonantFilter::new(sample_rate)?,
            envelopes,
        })
    }

    /// Start (or retrigger) a MIDI note.
    pub fn start(&mut self, note: u8, velocity: u8, age: u64, params: &SynthParams) {
        self.note = note;
        self.velocity = velocity;
        self.age = age;
        self.start_note(self.sample_rate, midi_note_to_freq(note), params);
    }

    /// Seed every component for a note at `frequency` Hz.
    ///
    /// Calling this on a sounding voice is a hard retrigger: phases,
    /// filter memory and LFO smoothing restart, envelopes re-enter their
    /// attack from the current level.
    pub fn start_note(&mut self, sample_rate: f32, frequency: f32, params: &SynthParams) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        debug_assert!(frequency >= 0.0, "note frequency must not be negative");
        self.sample_rate = sample_rate;

        for (chain, osc) in self.chains.iter_mut().zip(&params.oscillators) {
            chain.start_note(
                sample_rate,
                Waveshape::from_id(osc.waveshape),
                frequency,
                osc.unison,
                osc.detune,
            );
        }

        for (envelope, adsr) in self.envelopes.iter_mut().zip(&params.envelopes) {
            envelope.set_sample_rate(sample_rate);
            envelope.set_parameters(*adsr);
            envelope.note_on();
        }

        self.filter
            .start_note(sample_rate, params.filter.cutoff, params.filter.resonance);

        for (lfo, settings) in self.lfos.iter_mut().zip(&params.lfos) {
            lfo.start_note(
                sample_rate,
                Waveshape::from_id(settings.waveshape),
                settings.rate,
                settings.amount,
            );
        }

        self.state = VoiceState::Active;
    }

    /// `start_note` for hosts that have not validated their inputs yet.
    pub fn try_start_note(
        &mut self,
        sample_rate: f32,
        frequency: f32,
        params: &SynthParams,
    ) -> Result<()> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        let frequency = validate_frequency(frequency)?;
        self.start_note(sample_rate, frequency, params);
        Ok(())
    }

    /// Release the note. The voice keeps sounding through the release tail.
    pub fn stop_note(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            for envelope in &mut self.envelopes {
                envelope.note_off();
            }
        }
    }

    /// Render one mono sample, before headroom.
    #[inline]
    pub fn next_sample(&mut self, params: &SynthParams) -> f32 {
        let unison = [
            self.chains[0].process_unison(),
            self.chains[1].process_unison(),
        ];

        let lfo_values = [self.lfos[0].process(), self.lfos[1].process()];

        for destination in ModulationDestination::ALL {
            for (settings, &value) in params.lfos.iter().zip(&lfo_values) {
                if ModulationSource::is_applied_to(settings.destination, destination) {
                    self.apply_modulation(destination, value * destination.scale());
                }
            }
        }

        let mut mix = 0.0;
        for (c, chain) in self.chains.iter_mut().enumerate() {
            let primary = chain.process_primary();
            let normalized = chain.normalize(primary, unison[c]);
            let envelope = self.envelopes[c].next_sample();
            mix += envelope * params.oscillators[c].level * normalized;
        }

        if params.filter.enabled {
            self.filter
                .process(mix, FilterType::from_id(params.filter.filter_type))
        } else {
            self.filter.clear_modulation();
            mix
        }
    }

    fn apply_modulation(&mut self, destination: ModulationDestination, offset: f32) {
        match destination.target() {
            ModulationTarget::Oscillator { index, slot } => {
                let osc = self.chains[index].primary_mut();
                match slot {
                    OffsetSlot::Frequency => osc.add_frequency_offset(offset),
                    OffsetSlot::Phase => osc.add_phase_offset(offset),
                    OffsetSlot::Amplitude => osc.add_amplitude_offset(offset),
                }
            }
            ModulationTarget::FilterCutoff => self.filter.add_frequency_offset(offset),
        }
    }

    /// Add `num_frames` frames into interleaved `out`, starting at
    /// `start_frame`. Every channel receives the same sample.
    ///
    /// Stops early once both envelopes have finished; the voice is Idle
    /// from then on.
    pub fn render_next_block(
        &mut self,
        out: &mut [f32],
        channels: usize,
        start_frame: usize,
        num_frames: usize,
        params: &SynthParams,
    ) {
        debug_assert!(channels > 0);
        let frames = out
            .chunks_exact_mut(channels)
            .skip(start_frame)
            .take(num_frames);

        for frame in frames {
            if self.state == VoiceState::Idle {
                break;
            }

            let sample = self.next_sample(params) * OUTPUT_HEADROOM;
            for slot in frame.iter_mut() {
                *slot += sample;
            }

            if !self.envelopes.iter().any(|env| env.is_active()) {
                self.clear_note();
            }
        }
    }

    /// Render into the whole of `out`.
    /// Does nothing when `channels` is 0.
    pub fn render(&mut self, out: &mut [f32], channels: usize, params: &SynthParams) {
        if channels == 0 {
            return;
        }
        let frames = out.len() / channels;
        self.render_next_block(out, channels, 0, frames, params);
    }

    /// Return to the pool without a tail.
    pub fn clear_note(&mut self) {
        self.state = VoiceState::Idle;
        self.note = 0;
        self.velocity = 0;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    /// Louder of the two envelopes.
    pub fn envelope_level(&self) -> f32 {
        self.envelopes[0].level().max(self.envelopes[1].level())
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn chain(&self, index: usize) -> &UnisonStack {
        &self.chains[index]
    }

    pub fn lfo(&self, index: usize) -> &ModulationSource {
        &self.lfos[index]
    }

    pub fn envelope(&self, index: usize) -> &E {
        &self.envelopes[index]
    }

    pub fn filter(&self) -> &ResonantFilter {
        &self.filter
    }
}
