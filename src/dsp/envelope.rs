#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

The voice only relies on the `EnvelopeGenerator` contract below; `Adsr` is
the linear implementation shipped with the engine.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (note_on) triggers Attack.
              Gate low (note_off) triggers Release from wherever we are.

  increment   How much `level` changes per sample. Calculated from the stage
              duration and sample rate.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)


Zero-Length Stages
------------------

A stage with a duration of 0 seconds is skipped entirely at the moment it
would begin:

  attack = 0   note_on jumps straight to level 1.0 (or to sustain if the
               decay is also 0)
  decay  = 0   the peak drops to the sustain level immediately
  release = 0  note_off goes straight to Idle, level 0

So ADSR (0, 0, 1, 0) is a pure gate: full level from the first sample,
silence from the first sample after note_off.


The State Machine
-----------------

    Idle ──note_on──► Attack ──level=1──► Decay ──level=S──► Sustain
      ▲                  │                  │                  │
      │                  └──── note_off ────┴──── note_off ────┘
      │                                     ▼
      └──────────── level=0 ─────────── Release

note_off triggers Release from ANY active stage and always starts from the
CURRENT level, not the sustain level. This prevents clicks when releasing
during attack.

`is_active()` only turns false once Release has fully reached 0.0.

Release is special: we snapshot the starting level and total samples at
note_off time, then interpolate linearly. This ensures we hit exactly 0.0.

note_on during Release (or any other stage) starts the attack from the
current level, so a retriggered or stolen voice does not click.
*/

/// Stage durations in seconds, sustain as a level in [0, 1].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl AdsrParams {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self::new(1.0, 0.5, 0.4, 0.5)
    }
}

/// Amplitude envelope as seen by a voice.
pub trait EnvelopeGenerator: Send {
    fn set_sample_rate(&mut self, sample_rate: f32);

    fn set_parameters(&mut self, params: AdsrParams);

    /// Gate high: restart from the attack stage.
    fn note_on(&mut self);

    /// Gate low: release from the current level.
    fn note_off(&mut self);

    /// Advance one sample and return the new level in [0, 1].
    fn next_sample(&mut self) -> f32;

    /// False only once the release has fully decayed.
    fn is_active(&self) -> bool;

    fn level(&self) -> f32;
}

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

#[derive(Debug, Clone)]
pub struct Adsr {
    params: AdsrParams,
    sample_rate: f32,

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,

    // Decay bookkeeping
    decay_start_level: f32,

    // Release bookkeeping (we pre-calculate at note_off for precision)
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Adsr {
    pub fn new() -> Self {
        Self::with_params(AdsrParams::default())
    }

    pub fn with_params(params: AdsrParams) -> Self {
        let mut env = Self {
            params: AdsrParams::default(),
            sample_rate: 48_000.0,
            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        };
        env.set_parameters(params);
        env
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn params(&self) -> AdsrParams {
        self.params
    }

    fn enter_decay(&mut self) {
        self.level = 1.0;
        self.decay_start_level = 1.0;
        if self.params.decay > 0.0 {
            self.stage = EnvelopeState::Decay;
        } else {
            self.enter_sustain();
        }
    }

    fn enter_sustain(&mut self) {
        self.level = self.params.sustain;
        self.stage = EnvelopeState::Sustain;
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeGenerator for Adsr {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
    }

    fn set_parameters(&mut self, params: AdsrParams) {
        self.params = AdsrParams {
            attack: params.attack.max(0.0),
            decay: params.decay.max(0.0),
            sustain: params.sustain.clamp(0.0, 1.0),
            release: params.release.max(0.0),
        };
    }

    fn note_on(&mut self) {
        self.release_elapsed_samples = 0;
        if self.params.attack > 0.0 {
            // Ramp up from wherever a retriggered note left off
            self.stage = EnvelopeState::Attack;
        } else {
            self.enter_decay();
        }
    }

    fn note_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        if self.params.release <= 0.0 {
            self.reset();
            return;
        }

        // Snapshot current level - we'll interpolate from here to 0
        self.release_start_level = self.level;
        self.release_total_samples =
            (self.params.release * self.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                // Per-sample step to reach 1.0 in attack seconds
                let increment = 1.0 / (self.params.attack * self.sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.enter_decay();
                }
            }

            EnvelopeState::Decay => {
                let target = self.params.sustain;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.params.decay * self.sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.enter_sustain();
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                // level = start * (1 - elapsed/total)
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    fn level(&self) -> f32 {
        self.level
    }
}
