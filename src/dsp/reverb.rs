//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation uses the classic
//! Schroeder reverb algorithm.
//!
//! # Schroeder Reverb Architecture
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! ## Comb Filters
//!
//! ```text
//! y[n] = x[n] + feedback * lowpass(y[n - delay])
//! ```
//!
//! The delay times are mutually prime to avoid resonant buildup at specific
//! frequencies.
//!
//! ## Allpass Filters
//!
//! ```text
//! y[n] = -g * x[n] + x[n - delay] + g * y[n - delay]
//! ```
//!
//! # The Send
//!
//! [`ReverbSend`] is the fixed-setting effect the pool applies after voice
//! summation: one network per output channel, each channel's delay lines a
//! little longer than the previous one's so the tails decorrelate into a
//! stereo image, mixed as `0.5 * dry + 0.5 * wet`.
//!
//! Delay buffers are sized for the sample rate once, at construction. Nothing
//! on the processing path allocates.

/// Comb delay times in ms (mutually prime ratios).
const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
/// Allpass delay times in ms.
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

/// Extra delay per channel, in ms (23 samples at 44.1 kHz).
pub const STEREO_SPREAD_MS: f32 = 0.52;

pub const DRY_LEVEL: f32 = 0.5;
pub const WET_LEVEL: f32 = 0.5;
pub const ROOM_SIZE: f32 = 0.5;
pub const DAMPING: f32 = 0.5;

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// A damped feedback comb filter.
#[derive(Debug, Clone)]
pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass for damping (absorbs high frequencies)
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;

        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// Allpass diffuser.
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.feedback * input + delayed;

        self.buffer[self.write_pos] = input + self.feedback * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Schroeder reverb with 4 comb filters and 2 allpass filters.
#[derive(Debug, Clone)]
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_spread(sample_rate, 0.0)
    }

    /// Every delay line lengthened by `spread_ms`.
    pub fn with_spread(sample_rate: f32, spread_ms: f32) -> Self {
        let comb = |ms: f32| CombFilter::new(ms_to_samples(ms + spread_ms, sample_rate));
        let allpass = |ms: f32| AllpassFilter::new(ms_to_samples(ms + spread_ms, sample_rate));

        let mut reverb = Self {
            combs: COMB_DELAYS_MS.map(comb),
            allpasses: ALLPASS_DELAYS_MS.map(allpass),
        };
        reverb.set_room_size(ROOM_SIZE);
        reverb.set_damping(DAMPING);
        reverb
    }

    /// Scales comb feedback: 0.7 at 0.0 up to 0.98 at 1.0.
    pub fn set_room_size(&mut self, size: f32) {
        let feedback = 0.7 + size.clamp(0.0, 1.0) * 0.28;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

/// Fixed-setting reverb applied in place to an interleaved buffer.
#[derive(Debug, Clone)]
pub struct ReverbSend {
    networks: Vec<SchroederReverb>,
    dry: f32,
    wet: f32,
}

impl ReverbSend {
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let networks = (0..channels.max(1))
            .map(|channel| {
                SchroederReverb::with_spread(sample_rate, channel as f32 * STEREO_SPREAD_MS)
            })
            .collect();

        Self {
            networks,
            dry: DRY_LEVEL,
            wet: WET_LEVEL,
        }
    }

    pub fn channels(&self) -> usize {
        self.networks.len()
    }

    /// `buffer` holds `frames * channels()` interleaved samples.
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        let channels = self.networks.len();
        debug_assert_eq!(buffer.len() % channels, 0);

        for frame in buffer.chunks_exact_mut(channels) {
            for (sample, network) in frame.iter_mut().zip(&mut self.networks) {
                let wet = network.process(*sample);
                *sample = self.dry * *sample + self.wet * wet;
            }
        }
    }

    /// Drop any tail still ringing in the delay lines.
    pub fn reset(&mut self) {
        for network in &mut self.networks {
            network.reset();
        }
    }
}
