//! Speaker enrollment and verification from acoustic features.
//!
//! # Architecture
//!
//! Two comparison modes sit on top of `vocalid-audio`:
//!
//! 1. Templates: [`Enroller::enroll`] reduces N utterances to mean MFCC
//!    vectors, [`TemplateBuilder`] aggregates them into a [`VoiceTemplate`],
//!    and [`compare_templates`] scores a probe against it.
//! 2. Single utterances: [`VoiceFeatures::extract`] summarizes one
//!    utterance (pitch, amplitude, spectral scalars, envelope, fingerprint)
//!    and [`compare_features`] scores two summaries.
//!
//! Live audio is cut into utterances by a [`CaptureWorker`], which runs the
//! voice activity detector on its own task.
//!
//! # Scores
//!
//! Every score is in `[0, 1]`, comparing anything with itself yields 1, and
//! an invalid template scores 0 against everything.

mod capture;
mod enroll;
mod error;
mod features;
mod template;
mod verifier;

pub use capture::{CaptureConfig, CaptureWorker, Segment};
pub use enroll::{EnrollConfig, Enroller, Utterance};
pub use error::VoiceprintError;
pub use features::VoiceFeatures;
pub use template::{MIN_QUALITY, TemplateBuilder, TemplateConfig, VoiceTemplate};
pub use verifier::{MatchScore, MatchWeights, compare_features, compare_templates, score_templates};
