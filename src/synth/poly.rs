use crate::{
    dsp::reverb::ReverbSend,
    error::{validate_sample_rate, EngineError, Result},
    synth::{
        message::{MessageReceiver, SynthMessage},
        params::SynthParams,
        voice::{Voice, VoiceState},
    },
};

/// What the UI needs to know about one voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub note: u8,
    pub state: VoiceState,
    pub envelope_level: f32,
}

impl Default for VoiceSnapshot {
    fn default() -> Self {
        Self {
            note: 0,
            state: VoiceState::Idle,
            envelope_level: 0.0,
        }
    }
}

/// Fixed pool of voices driven by note messages.
///
/// Each `render_block` call drains the receiver, then adds every sounding
/// voice into the interleaved output and applies the reverb send when it
/// is switched on. Voices, reverb delay lines and the message queue are
/// all allocated up front.
pub struct VoicePool<R: MessageReceiver> {
    voices: Vec<Voice>,
    rx: R,
    reverb: ReverbSend,
    reverb_engaged: bool,
    sample_rate: f32,
    channels: usize,
    next_age: u64,
    frame_counter: u64,
}

impl<R: MessageReceiver> VoicePool<R> {
    pub fn new(sample_rate: f32, channels: usize, voice_count: usize, rx: R) -> Result<Self> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        if channels == 0 {
            return Err(EngineError::InvalidChannelCount { channels });
        }
        if voice_count == 0 {
            return Err(EngineError::InvalidVoiceCount {
                voices: voice_count,
            });
        }

        let voices = (0..voice_count)
            .map(|_| Voice::new(sample_rate))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            voices,
            rx,
            reverb: ReverbSend::new(sample_rate, channels),
            reverb_engaged: false,
            sample_rate,
            channels,
            next_age: 0,
            frame_counter: 0,
        })
    }

    /// Render `out.len() / channels` frames of interleaved audio.
    ///
    /// `out` is overwritten, not mixed into.
    pub fn render_block(&mut self, out: &mut [f32], params: &SynthParams) {
        debug_assert_eq!(out.len() % self.channels, 0);

        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg, params);
        }

        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render(out, self.channels, params);
            }
        }

        if params.reverb {
            self.reverb.process_interleaved(out);
            self.reverb_engaged = true;
        } else if self.reverb_engaged {
            // Switching back on later must not replay an old tail.
            self.reverb.reset();
            self.reverb_engaged = false;
        }

        self.frame_counter += (out.len() / self.channels) as u64;
    }

    pub fn handle_message(&mut self, msg: SynthMessage, params: &SynthParams) {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity, params),
            SynthMessage::NoteOff { note, .. } => self.note_off(note),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Start `note` on a free voice, stealing one if the pool is full.
    /// A note that is already held is released first.
    pub fn note_on(&mut self, note: u8, velocity: u8, params: &SynthParams) {
        self.note_off(note);

        let age = self.next_age;
        self.next_age += 1;

        if let Some(voice) = self.allocate_voice() {
            voice.start(note, velocity, age, params);
        }
    }

    /// Release every held voice playing `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.state() == VoiceState::Active && voice.note() == note {
                voice.stop_note();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.stop_note();
        }
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice> {
        // First pass: free voice
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(&mut self.voices[idx]);
        }

        // Second pass: oldest releasing, then oldest held
        let oldest_in = |state: VoiceState| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state() == state)
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        };
        let steal_idx = oldest_in(VoiceState::Releasing).or_else(|| oldest_in(VoiceState::Active));

        steal_idx.map(|idx| &mut self.voices[idx])
    }

    /// Fill `out` with per-voice snapshots; returns how many were written.
    pub fn collect_voice_states(&self, out: &mut [VoiceSnapshot]) -> usize {
        let mut written = 0;
        for (slot, voice) in out.iter_mut().zip(&self.voices) {
            *slot = VoiceSnapshot {
                note: voice.note(),
                state: voice.state(),
                envelope_level: voice.envelope_level(),
            };
            written += 1;
        }
        written
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames rendered since construction.
    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }
}
