use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{validate_sample_rate, Result};

/*
| type      | id | passes          | rejects      |
| --------- | -- | --------------- | ------------ |
| low-pass  | 0  | below cutoff    | above cutoff |
| high-pass | 1  | above cutoff    | below cutoff |
| band-pass | 2  | around cutoff   | both sides   |

Topology-preserving state-variable filter. All three responses come out of
the same two integrators, so switching type mid-note keeps the memory.

Per-sample coefficients
-----------------------

The cutoff is modulated per sample (LFO → cutoff), so `g`, `k` and `h` are
recomputed on EVERY call to `process`, from

    effective_cutoff = base_cutoff + frequency_offset

The frequency offset is single-sample-lived: `process` clears it, so a
modulation source must push again on the next sample.

The cutoff that reaches the coefficient math is clamped to
[MIN_CUTOFF_HZ, 0.49 * sample_rate]; the tan() prewarp explodes at Nyquist
and negative frequencies are meaningless. `effective_cutoff()` reports the
unclamped sum so modulation depth can be observed directly.

Resonance
---------

    k = 2 - 2 * resonance * MAX_RESONANCE      (damping)

resonance 0   → k = 2     (Q = 0.5, no peak)
resonance 1   → k = 0.05  (Q = 20, strong peak, still stable)
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
const MAX_CUTOFF_RATIO: f32 = 0.49;
const MAX_RESONANCE: f32 = 0.975;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

impl FilterType {
    pub const ALL: [FilterType; 3] = [
        FilterType::LowPass,
        FilterType::HighPass,
        FilterType::BandPass,
    ];

    /// Unknown ids mean "no filtering", not an error.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(FilterType::LowPass),
            1 => Some(FilterType::HighPass),
            2 => Some(FilterType::BandPass),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            FilterType::LowPass => 0,
            FilterType::HighPass => 1,
            FilterType::BandPass => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterType::LowPass => "LowPass",
            FilterType::HighPass => "HighPass",
            FilterType::BandPass => "BandPass",
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Coefficients derived from (sample rate, cutoff, resonance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfCoefficients {
    pub g: f32,
    pub k: f32,
    pub h: f32,
}

impl SvfCoefficients {
    pub fn new(sample_rate: f32, cutoff_hz: f32, resonance: f32) -> Self {
        // Nyquist bound wins at sample rates too low for MIN_CUTOFF_HZ
        let cutoff = cutoff_hz
            .max(MIN_CUTOFF_HZ)
            .min(sample_rate * MAX_CUTOFF_RATIO);

        // Bilinear prewarp: analog cutoff that lands on `cutoff` after discretization
        let wd = TAU * cutoff;
        let wa = (2.0 * sample_rate) * (wd / (2.0 * sample_rate)).tan();
        let g = wa / (2.0 * sample_rate);

        let k = 2.0 - 2.0 * resonance.clamp(0.0, 1.0) * MAX_RESONANCE;
        let h = 1.0 / (1.0 + g * (g + k));

        Self { g, k, h }
    }
}

#[derive(Debug, Clone)]
pub struct ResonantFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    sample_rate: f32,
    base_cutoff: f32,
    resonance: f32,
    frequency_offset: f32,

    effective_cutoff: f32,
    coefficients: SvfCoefficients,
}

impl ResonantFilter {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        Ok(Self::with_sample_rate(sample_rate))
    }

    /// Caller guarantees `sample_rate > 0`.
    pub(crate) fn with_sample_rate(sample_rate: f32) -> Self {
        let base_cutoff = 1_000.0;
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            sample_rate,
            base_cutoff,
            resonance: 0.0,
            frequency_offset: 0.0,
            effective_cutoff: base_cutoff,
            coefficients: SvfCoefficients::new(sample_rate, base_cutoff, 0.0),
        }
    }

    /// Seed for a new note and clear the integrators so nothing from the
    /// previous note leaks in.
    pub fn start_note(&mut self, sample_rate: f32, cutoff_hz: f32, resonance: f32) {
        self.reset();
        self.set_sample_rate(sample_rate);
        self.set_cutoff(cutoff_hz);
        self.set_resonance(resonance);
        self.frequency_offset = 0.0;
        self.effective_cutoff = cutoff_hz;
        self.coefficients = SvfCoefficients::new(self.sample_rate, cutoff_hz, self.resonance);
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.base_cutoff = cutoff;
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance;
    }

    /// Cutoff modulation in Hz for the next sample only. Contributions add.
    pub fn add_frequency_offset(&mut self, offset: f32) {
        self.frequency_offset += offset;
    }

    /// Drop pending cutoff modulation without rendering a sample.
    pub fn clear_modulation(&mut self) {
        self.frequency_offset = 0.0;
    }

    pub fn next_sample(&mut self, sample: f32, coefficients: SvfCoefficients) -> FilterOutputs {
        let SvfCoefficients { g, k, h } = coefficients;
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    /// Filter one sample with the requested response.
    ///
    /// `None` (an unrecognized type id) passes the input through untouched;
    /// pending modulation is consumed either way.
    #[inline]
    pub fn process(&mut self, input: f32, filter_type: Option<FilterType>) -> f32 {
        self.effective_cutoff = self.base_cutoff + self.frequency_offset;
        self.frequency_offset = 0.0;

        let Some(filter_type) = filter_type else {
            return input;
        };

        self.coefficients =
            SvfCoefficients::new(self.sample_rate, self.effective_cutoff, self.resonance);
        let outputs = self.next_sample(input, self.coefficients);

        match filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], filter_type: Option<FilterType>) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, filter_type);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.base_cutoff
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// `base + offset` as seen by the most recent `process` call.
    pub fn effective_cutoff(&self) -> f32 {
        self.effective_cutoff
    }

    pub fn pending_offset(&self) -> f32 {
        self.frequency_offset
    }

    pub fn coefficients(&self) -> SvfCoefficients {
        self.coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::ModulatableOscillator;
    use crate::dsp::waveform::Waveshape;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn filter(cutoff: f32, resonance: f32) -> ResonantFilter {
        let mut filter = ResonantFilter::new(SAMPLE_RATE).unwrap();
        filter.start_note(SAMPLE_RATE, cutoff, resonance);
        filter
    }

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        let mut osc = ModulatableOscillator::new(Waveshape::Sine);
        osc.start_note(SAMPLE_RATE, Waveshape::Sine, frequency);
        (0..len).map(|_| osc.process()).collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(64);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn tiny_sample_rates_build_a_filter() {
        // 0.49 * 30 Hz sits below MIN_CUTOFF_HZ
        let mut filter = ResonantFilter::new(30.0).unwrap();
        filter.start_note(30.0, 1_000.0, 0.5);
        let out = filter.process(1.0, Some(FilterType::LowPass));
        assert!(out.is_finite());

        let coefficients = SvfCoefficients::new(30.0, 5.0, 0.0);
        assert!(coefficients.g.is_finite() && coefficients.h.is_finite());
    }

    #[test]
    fn rejects_invalid_sample_rate() {
        assert!(ResonantFilter::new(0.0).is_err());
        assert!(ResonantFilter::new(-1.0).is_err());
    }

    #[test]
    fn test_lowpass_basic() {
        let mut filter = filter(500.0, 0.0);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer, Some(FilterType::LowPass));

        assert!(buffer[511] > 0.99, "dc should pass: {}", buffer[511]);
    }

    #[test]
    fn test_highpass_basic() {
        let mut filter = filter(500.0, 0.0);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer, Some(FilterType::HighPass));

        assert!(buffer[511].abs() < 0.001, "dc should be blocked: {}", buffer[511]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = filter(500.0, 0.0);
        let mut buffer = sine(5_000.0, 512);

        filter.render(&mut buffer, Some(FilterType::LowPass));

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.3, "Expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let cutoff = 1_000.0;

        let mut filter = filter(cutoff, 0.5);
        let mut pass = sine(cutoff, 1024);
        filter.render(&mut pass, Some(FilterType::BandPass));
        let pass_peak = peak_after_transient(&pass);

        filter.reset();
        let mut off = sine(100.0, 1024);
        filter.render(&mut off, Some(FilterType::BandPass));
        let off_peak = peak_after_transient(&off);

        assert!(
            pass_peak > off_peak * 2.0,
            "expected bandpass to emphasize cutoff freq, got pass_peak={pass_peak}, off_peak={off_peak}"
        );
    }

    #[test]
    fn test_resonance_boosts_cutoff_region() {
        let cutoff = 1_000.0;

        let mut low = filter(cutoff, 0.1);
        let mut buffer1 = sine(cutoff, 2048);
        low.render(&mut buffer1, Some(FilterType::LowPass));

        let mut high = filter(cutoff, 0.9);
        let mut buffer2 = sine(cutoff, 2048);
        high.render(&mut buffer2, Some(FilterType::LowPass));

        let peak_low = peak_after_transient(&buffer1);
        let peak_high = peak_after_transient(&buffer2);
        assert!(
            peak_high > peak_low * 1.2,
            "resonance should boost: high={peak_high}, low={peak_low}"
        );
    }

    #[test]
    fn unknown_type_passes_through() {
        let mut filter = filter(200.0, 0.5);
        filter.add_frequency_offset(300.0);

        assert_eq!(filter.process(0.42, FilterType::from_id(3)), 0.42);
        assert_eq!(filter.pending_offset(), 0.0);
    }

    #[test]
    fn offset_applies_to_one_sample_only() {
        let mut filter = filter(400.0, 0.2);

        filter.add_frequency_offset(350.0);
        filter.add_frequency_offset(350.0);
        filter.process(0.0, Some(FilterType::LowPass));
        assert_eq!(filter.effective_cutoff(), 1_100.0);
        assert_eq!(filter.pending_offset(), 0.0);

        filter.process(0.0, Some(FilterType::LowPass));
        assert_eq!(filter.effective_cutoff(), 400.0);
    }

    #[test]
    fn cutoff_step_shows_up_on_the_next_sample() {
        let input = sine(3_000.0, 256);
        let mut steady = filter(300.0, 0.2);
        for &x in &input[..255] {
            steady.process(x, Some(FilterType::LowPass));
        }
        let mut stepped = steady.clone();

        let steady_coeffs = steady.coefficients();
        let a = steady.process(input[255], Some(FilterType::LowPass));

        stepped.add_frequency_offset(5_000.0);
        let b = stepped.process(input[255], Some(FilterType::LowPass));

        assert_ne!(stepped.coefficients(), steady_coeffs);
        assert!((a - b).abs() > 1e-4, "cutoff step not reflected: {a} vs {b}");
    }

    #[test]
    fn start_note_clears_memory() {
        let mut filter = filter(800.0, 0.3);
        for x in sine(200.0, 512) {
            filter.process(x, Some(FilterType::LowPass));
        }

        filter.start_note(SAMPLE_RATE, 800.0, 0.3);
        assert_eq!(filter.process(0.0, Some(FilterType::LowPass)), 0.0);
    }

    #[test]
    fn extreme_modulation_stays_finite() {
        let mut filter = filter(100.0, 1.0);
        for (i, x) in sine(440.0, 2048).into_iter().enumerate() {
            let offset = if i % 2 == 0 { -700.0 } else { 40_000.0 };
            filter.add_frequency_offset(offset);
            let y = filter.process(x, Some(FilterType::BandPass));
            assert!(y.is_finite(), "sample {i} blew up: {y}");
        }
    }

    #[test]
    fn type_ids_round_trip() {
        for filter_type in FilterType::ALL {
            assert_eq!(FilterType::from_id(filter_type.id()), Some(filter_type));
        }
        assert_eq!(FilterType::from_id(-1), None);
    }
}
