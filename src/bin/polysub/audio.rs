//! cpal output stream driving the voice pool.

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use polysub::{
    synth::{ParamStore, SynthMessage, VoicePool, VoiceSnapshot},
    DEFAULT_VOICE_COUNT, MAX_BLOCK_SIZE,
};

/// Samples kept for the scope and spectrum.
pub const VIS_BLOCK_LEN: usize = 1024;
const AUDIO_RING_BLOCKS: usize = 16;
const MESSAGE_RING_LEN: usize = 64;
const STATE_RING_LEN: usize = 32;

pub const MAX_UI_VOICES: usize = 8;

/// Voice overview sent from the audio thread once per callback.
#[derive(Debug, Clone, Copy)]
pub struct VoiceUpdate {
    pub voices: [VoiceSnapshot; MAX_UI_VOICES],
    pub count: usize,
}

impl Default for VoiceUpdate {
    fn default() -> Self {
        Self {
            voices: [VoiceSnapshot::default(); MAX_UI_VOICES],
            count: 0,
        }
    }
}

/// Everything the UI thread holds on to while audio runs.
pub struct AudioHandle {
    // Dropping the stream stops playback.
    _stream: cpal::Stream,
    pub sample_rate: f32,
    pub channels: usize,
    pub voices: usize,
    pub messages: Producer<SynthMessage>,
    pub samples: Consumer<f32>,
    pub states: Consumer<VoiceUpdate>,
}

pub fn start(params: Arc<ParamStore>) -> EyreResult<AudioHandle> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (msg_tx, msg_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_RING_LEN);
    let (audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BLOCK_LEN * AUDIO_RING_BLOCKS);
    let (state_tx, state_rx) = RingBuffer::<VoiceUpdate>::new(STATE_RING_LEN);

    let mut pool = VoicePool::new(sample_rate, channels, DEFAULT_VOICE_COUNT, msg_rx)
        .wrap_err("failed to build voice pool")?;

    let stream = device
        .build_output_stream(
            &config.into(),
            {
                let mut audio_tx = audio_tx;
                let mut state_tx = state_tx;
                move |data: &mut [f32], _| {
                    let snapshot = params.snapshot();

                    for block in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                        pool.render_block(block, &snapshot);

                        // First channel to the UI ring, drop on overflow
                        for frame in block.chunks_exact(channels) {
                            if let Err(PushError::Full(_)) = audio_tx.push(frame[0]) {
                                break;
                            }
                        }
                    }

                    let mut update = VoiceUpdate::default();
                    update.count = pool.collect_voice_states(&mut update.voices);
                    let _ = state_tx.push(update);
                }
            },
            move |err| eprintln!("Stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    Ok(AudioHandle {
        _stream: stream,
        sample_rate,
        channels,
        voices: DEFAULT_VOICE_COUNT,
        messages: msg_tx,
        samples: audio_rx,
        states: state_rx,
    })
}
