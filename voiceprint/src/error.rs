use thiserror::Error;

use vocalid_audio::AudioError;

/// Errors returned by voiceprint operations.
#[derive(Debug, Error)]
pub enum VoiceprintError {
    #[error("audio too short: need at least {min_samples} samples, got {got_samples}")]
    AudioTooShort {
        min_samples: usize,
        got_samples: usize,
    },

    #[error("enrollment needs at least one utterance")]
    EmptyEnrollment,

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("template encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("capture worker is closed")]
    Closed,
}
