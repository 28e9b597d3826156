use thiserror::Error;

use crate::verifier::VerifierState;

/// Failures reported by an upstream speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("audio problem")]
    Audio,
    #[error("client error")]
    Client,
    #[error("insufficient permissions")]
    InsufficientPermissions,
    #[error("network problem")]
    Network,
    #[error("network timeout")]
    NetworkTimeout,
    #[error("no match found")]
    NoMatch,
    #[error("recognizer busy")]
    RecognizerBusy,
    #[error("server error")]
    Server,
    #[error("speech timeout")]
    SpeechTimeout,
    #[error("unknown recognizer error: {0}")]
    Unknown(i32),
}

/// Errors returned by passphrase operations.
#[derive(Debug, Error)]
pub enum PassphraseError {
    #[error("verifier is {state}, expected {expected}")]
    InvalidState {
        state: VerifierState,
        expected: VerifierState,
    },

    #[error("passphrase catalog is empty")]
    EmptyCatalog,

    #[error("random source failed: {0}")]
    Random(String),
}
