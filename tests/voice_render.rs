//! End-to-end rendering through `Voice` and `VoicePool`.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use polysub::{
    dsp::{envelope::AdsrParams, lfo::ModulationDestination, waveform::Waveshape},
    synth::{ParamId, ParamStore, SynthMessage, SynthParams, Voice, VoicePool, VoiceState},
    EngineError, OUTPUT_HEADROOM,
};

const SAMPLE_RATE: f32 = 48_000.0;

/// Osc 1 only, sine, no unison, filter off, ADSR (0, 0, 1, 0).
fn plain_sine() -> SynthParams {
    let mut params = SynthParams::default();
    params.oscillators[0].waveshape = Waveshape::Sine.id();
    params.oscillators[0].unison = 0;
    params.oscillators[0].level = 0.5;
    params.oscillators[1].level = 0.0;
    params.filter.enabled = false;
    params.envelopes = [AdsrParams::new(0.0, 0.0, 1.0, 0.0); 2];
    params
}

fn reference_sine(n: usize, frequency: f64, level: f32) -> f32 {
    let phase = frequency * n as f64 / SAMPLE_RATE as f64;
    ((TAU * phase).sin() as f32) * level * OUTPUT_HEADROOM
}

#[test]
fn sine_voice_matches_reference_table() {
    let params = plain_sine();
    let mut voice = Voice::new(SAMPLE_RATE).unwrap();
    voice.start_note(SAMPLE_RATE, 440.0, &params);

    let mut out = vec![0.0f32; 2_048];
    voice.render(&mut out, 1, &params);

    for (i, &actual) in out.iter().enumerate() {
        let expected = reference_sine(i + 1, 440.0, 0.5);
        assert!(
            (actual - expected).abs() < 1e-5,
            "sample {i}: expected {expected}, got {actual}"
        );
    }
}

#[test]
fn pool_writes_the_same_sine_to_every_channel() {
    let params = plain_sine();
    let queue = VecDeque::from([SynthMessage::NoteOn {
        note: 69,
        velocity: 127,
    }]);
    let mut pool = VoicePool::new(SAMPLE_RATE, 2, 4, queue).unwrap();

    let mut out = vec![0.0f32; 2 * 512];
    pool.render_block(&mut out, &params);

    for (i, frame) in out.chunks_exact(2).enumerate() {
        let expected = reference_sine(i + 1, 440.0, 0.5);
        assert!((frame[0] - expected).abs() < 1e-5, "frame {i}");
        assert_eq!(frame[0], frame[1]);
    }
}

#[test]
fn two_in_phase_oscillators_sum() {
    let mut params = plain_sine();
    params.oscillators[1] = params.oscillators[0];
    params.oscillators[1].level = 0.25;

    let mut voice = Voice::new(SAMPLE_RATE).unwrap();
    voice.start_note(SAMPLE_RATE, 440.0, &params);

    let mut out = vec![0.0f32; 256];
    voice.render(&mut out, 1, &params);
    for (i, &actual) in out.iter().enumerate() {
        let expected = reference_sine(i + 1, 440.0, 0.75);
        assert!((actual - expected).abs() < 1e-5, "sample {i}");
    }
}

#[test]
fn filter_cutoff_follows_lfo_times_seven() {
    let mut params = plain_sine();
    params.filter.enabled = true;
    params.filter.cutoff = 300.0;
    params.lfos[0].destination = ModulationDestination::FilterCutoff.id();
    params.lfos[0].waveshape = Waveshape::Square.id();
    // 0 Hz square holds +0.5, so the smoothed value settles at 50.
    params.lfos[0].rate = 0.0;
    params.lfos[0].amount = 100.0;

    let mut voice = Voice::new(SAMPLE_RATE).unwrap();
    voice.start_note(SAMPLE_RATE, 440.0, &params);

    for n in 0..2_000 {
        voice.next_sample(&params);
        let lfo = voice.lfo(0).value();
        let expected = 300.0 + 7.0 * lfo;
        let actual = voice.filter().effective_cutoff();
        assert!(
            (actual - expected).abs() < 1e-3,
            "sample {n}: cutoff {actual}, expected {expected}"
        );
    }
    assert!((voice.lfo(0).value() - 50.0).abs() < 1e-3);
    assert!((voice.filter().effective_cutoff() - 650.0).abs() < 1e-2);
}

#[test]
fn modulation_never_outlives_its_sample() {
    let mut params = plain_sine();
    params.filter.enabled = true;
    params.lfos[0].destination = ModulationDestination::Osc1Fm.id();
    params.lfos[0].amount = 80.0;
    params.lfos[1].destination = ModulationDestination::FilterCutoff.id();
    params.lfos[1].amount = 80.0;

    let mut voice = Voice::new(SAMPLE_RATE).unwrap();
    voice.start_note(SAMPLE_RATE, 220.0, &params);

    for _ in 0..1_000 {
        voice.next_sample(&params);
        assert!(voice.chain(0).primary().offsets().is_zero());
        assert!(voice.chain(1).primary().offsets().is_zero());
        assert_eq!(voice.filter().pending_offset(), 0.0);
    }
}

#[test]
fn stop_note_decays_through_release() {
    let mut params = plain_sine();
    params.envelopes = [AdsrParams::new(0.0, 0.0, 1.0, 0.05); 2];

    let mut voice = Voice::new(SAMPLE_RATE).unwrap();
    voice.start_note(SAMPLE_RATE, 440.0, &params);
    let mut held = vec![0.0f32; 480];
    voice.render(&mut held, 1, &params);

    voice.stop_note();
    assert_eq!(voice.state(), VoiceState::Releasing);

    let mut previous_level = voice.envelope_level();
    let mut rendered = 0;
    while voice.is_active() {
        let mut frame = [0.0f32];
        voice.render(&mut frame, 1, &params);
        rendered += 1;

        let level = voice.envelope_level();
        assert!(level <= previous_level, "release rose at sample {rendered}");
        if voice.is_active() {
            assert!(level > 0.0, "silent before the envelopes finished");
        }
        previous_level = level;
        assert!(rendered <= 2_400 + 1, "release never finished");
    }

    // 50 ms at 48 kHz
    assert!(rendered >= 2_399, "release finished early after {rendered}");
    assert_eq!(voice.envelope_level(), 0.0);

    let mut after = vec![0.0f32; 64];
    voice.render(&mut after, 1, &params);
    assert!(after.iter().all(|&s| s == 0.0));
}

#[test]
fn unison_members_are_detuned_linearly() {
    let mut params = plain_sine();
    params.oscillators[0].unison = 3;
    params.oscillators[0].detune = 50.0;

    let mut voice = Voice::new(SAMPLE_RATE).unwrap();
    voice.start_note(SAMPLE_RATE, 440.0, &params);

    let chain = voice.chain(0);
    assert_eq!(chain.len(), 4);
    for (i, offset) in [(1, 5.0), (2, 10.0), (3, 15.0)] {
        let frequency = chain.member_frequency(i).unwrap();
        assert!((frequency - 440.0 - offset).abs() < 1e-4);
    }
}

#[test]
fn params_from_the_store_drive_the_pool() {
    let store = ParamStore::new();
    store.set_by_name("attack1", 0.1).unwrap();
    store.set_by_name("level2", 0.0).unwrap();
    store.set(ParamId::Osc1Waveshape, Waveshape::Square.id() as f32);

    let queue = VecDeque::from([SynthMessage::NoteOn {
        note: 57,
        velocity: 100,
    }]);
    let mut pool = VoicePool::new(SAMPLE_RATE, 1, 4, queue).unwrap();

    let params = store.snapshot();
    let mut out = vec![0.0f32; 4_800];
    pool.render_block(&mut out, &params);

    // Attack of 0.1 s reaches full level after 4800 samples.
    let peak = out.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    assert!(peak <= 0.5 * 0.5 * OUTPUT_HEADROOM + 1e-6, "peak {peak}");
    assert!(peak > 0.5 * 0.5 * OUTPUT_HEADROOM * 0.9, "peak {peak}");
    assert!(out.iter().all(|&s| s.abs() <= 1.0));
}

#[test]
fn checked_start_rejects_bad_host_input() {
    let params = plain_sine();
    let mut voice = Voice::new(SAMPLE_RATE).unwrap();

    assert_eq!(
        voice.try_start_note(SAMPLE_RATE, -1.0, &params),
        Err(EngineError::NegativeFrequency { freq: -1.0 })
    );
    assert!(voice.try_start_note(0.0, 440.0, &params).is_err());
    assert!(voice.is_free());

    voice.try_start_note(SAMPLE_RATE, 440.0, &params).unwrap();
    assert_eq!(voice.state(), VoiceState::Active);
}
