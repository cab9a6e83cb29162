//! Benchmarks for the resonant filter.
//!
//! Coefficients are recomputed every sample, so a static cutoff costs the
//! same as a modulated one; both are measured to keep it that way.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysub::dsp::filter::{FilterType, ResonantFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for filter_type in FilterType::ALL {
            let mut filter = ResonantFilter::new(SAMPLE_RATE).unwrap();
            filter.start_note(SAMPLE_RATE, 1_000.0, 0.5);
            group.bench_with_input(
                BenchmarkId::new(filter_type.name(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        filter.render(black_box(&mut buffer), Some(filter_type));
                    })
                },
            );
        }

        // Cutoff offset pushed every sample, as an LFO does
        let mut filter = ResonantFilter::new(SAMPLE_RATE).unwrap();
        filter.start_note(SAMPLE_RATE, 500.0, 0.7);
        group.bench_with_input(BenchmarkId::new("lowpass_modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in buffer.iter_mut().zip(&input).enumerate() {
                    filter.add_frequency_offset(black_box(i as f32));
                    *out = filter.process(x, Some(FilterType::LowPass));
                }
            })
        });
    }

    group.finish();
}
