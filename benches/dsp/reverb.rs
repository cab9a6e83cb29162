//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysub::dsp::reverb::{ReverbSend, SchroederReverb};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        // Generate a test signal (impulse-like with some content)
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        // Small room (short reverb)
        let mut reverb = SchroederReverb::new(SAMPLE_RATE);
        reverb.set_room_size(0.3);
        reverb.set_damping(0.5);
        group.bench_with_input(BenchmarkId::new("small_room", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += reverb.process(black_box(sample));
                }
                sum
            })
        });

        // Large room (long reverb)
        let mut reverb = SchroederReverb::new(SAMPLE_RATE);
        reverb.set_room_size(0.9);
        reverb.set_damping(0.3);
        group.bench_with_input(BenchmarkId::new("large_room", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += reverb.process(black_box(sample));
                }
                sum
            })
        });

        // Stereo send as the pool applies it
        let mut send = ReverbSend::new(SAMPLE_RATE, 2);
        let stereo: Vec<f32> = input.iter().flat_map(|&x| [x, -x]).collect();
        let mut buffer = stereo.clone();
        group.bench_with_input(BenchmarkId::new("stereo_send", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&stereo);
                send.process_interleaved(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
