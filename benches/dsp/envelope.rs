//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysub::dsp::envelope::{Adsr, AdsrParams, EnvelopeGenerator};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn envelope(attack: f32, decay: f32, sustain: f32, release: f32) -> Adsr {
    let mut env = Adsr::with_params(AdsrParams::new(attack, decay, sustain, release));
    env.set_sample_rate(SAMPLE_RATE);
    env
}

fn render(env: &mut Adsr, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = env.next_sample();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = envelope(0.1, 0.1, 0.7, 0.3);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let mut env = envelope(0.001, 0.001, 0.7, 0.3);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Release phase (ramping down)
        let mut env = envelope(0.001, 0.001, 0.7, 0.1);
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });
    }

    group.finish();
}
