//! Benchmarks for modulation sources.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysub::dsp::{lfo::ModulationSource, waveform::Waveshape};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine keeps the smoother ramping every sample
        let mut lfo = ModulationSource::new();
        lfo.start_note(SAMPLE_RATE, Waveshape::Sine, 2.0, 100.0);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = lfo.process();
                }
                black_box(&mut buffer);
            })
        });

        // Square mostly sits still, so the smoother is idle
        let mut lfo = ModulationSource::new();
        lfo.start_note(SAMPLE_RATE, Waveshape::Square, 2.0, 100.0);
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = lfo.process();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
