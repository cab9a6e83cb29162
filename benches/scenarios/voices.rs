//! Benchmarks for complete voices and the polyphonic pool.
//!
//! Patches range from the default two-oscillator voice to the worst case:
//! full unison on both chains, both LFOs routed, filter on.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use polysub::{
    dsp::{envelope::AdsrParams, lfo::ModulationDestination, waveform::Waveshape},
    synth::{SynthMessage, SynthParams, Voice, VoicePool},
    MAX_UNISON,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const CHANNELS: usize = 2;

/// Held notes so voices never finish mid-benchmark.
fn sustained(mut params: SynthParams) -> SynthParams {
    params.envelopes = [AdsrParams::new(0.01, 0.1, 0.7, 0.2); 2];
    params
}

fn plain() -> SynthParams {
    sustained(SynthParams::default())
}

fn heavy() -> SynthParams {
    let mut params = plain();
    for osc in &mut params.oscillators {
        osc.waveshape = Waveshape::Saw.id();
        osc.unison = MAX_UNISON;
        osc.detune = 40.0;
    }
    params.filter.enabled = true;
    params.filter.cutoff = 600.0;
    params.filter.resonance = 0.6;
    params.lfos[0].destination = ModulationDestination::FilterCutoff.id();
    params.lfos[0].amount = 50.0;
    params.lfos[1].destination = ModulationDestination::Osc2Fm.id();
    params.lfos[1].amount = 10.0;
    params
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size * CHANNELS];

        for (name, params) in [("voice_plain", plain()), ("voice_heavy", heavy())] {
            let mut voice = Voice::new(SAMPLE_RATE).unwrap();
            voice.start_note(SAMPLE_RATE, 110.0, &params);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    voice.render(black_box(&mut buffer), CHANNELS, &params);
                })
            });
        }

        // Four-note chord through the whole pool, reverb on
        let mut params = heavy();
        params.reverb = true;
        let chord = [48u8, 55, 60, 64].map(|note| SynthMessage::NoteOn {
            note,
            velocity: 100,
        });
        let mut pool = VoicePool::new(SAMPLE_RATE, CHANNELS, 4, VecDeque::from(chord)).unwrap();
        group.bench_with_input(BenchmarkId::new("pool_chord", size), &size, |b, _| {
            b.iter(|| pool.render_block(black_box(&mut buffer), &params))
        });
    }

    group.finish();
}
