//! Precondition failures raised before audio rendering starts.

use thiserror::Error;

/// Result type for engine setup.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Host misconfiguration detected while building the engine.
///
/// None of these are produced on the render path: everything that renders
/// samples assumes its inputs were validated here first.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid sample rate: {rate} (must be finite and > 0)")]
    InvalidSampleRate { rate: f32 },

    #[error("invalid frequency: {freq} Hz (must be finite and >= 0)")]
    NegativeFrequency { freq: f32 },

    #[error("invalid channel count: {channels}")]
    InvalidChannelCount { channels: usize },

    #[error("invalid voice count: {voices}")]
    InvalidVoiceCount { voices: usize },

    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },
}

pub fn validate_sample_rate(rate: f32) -> Result<f32> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(EngineError::InvalidSampleRate { rate })
    }
}

pub fn validate_frequency(freq: f32) -> Result<f32> {
    if freq.is_finite() && freq >= 0.0 {
        Ok(freq)
    } else {
        Err(EngineError::NegativeFrequency { freq })
    }
}
