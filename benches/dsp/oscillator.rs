//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysub::dsp::{oscillator::ModulatableOscillator, waveform::Waveshape};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for shape in Waveshape::ALL {
            let mut osc = ModulatableOscillator::new(shape);
            osc.start_note(SAMPLE_RATE, shape, 440.0);

            group.bench_with_input(BenchmarkId::new(shape.name(), size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.process();
                    }
                    black_box(&mut buffer);
                })
            });
        }

        // Per-sample FM offset, as the voice applies it
        let mut osc = ModulatableOscillator::new(Waveshape::Sine);
        osc.start_note(SAMPLE_RATE, Waveshape::Sine, 440.0);
        group.bench_with_input(BenchmarkId::new("sine_fm", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    osc.add_frequency_offset(black_box(25.0));
                    *sample = osc.process();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
