//! Audio processing for voice enrollment and verification.
//!
//! This crate provides:
//!
//! - `pcm`: 16-bit mono PCM format handling and sample conversions
//! - `wav`: WAV container reading and writing
//! - `resample`: sample-rate conversion to the 16 kHz analysis rate
//! - `vad`: energy-based voice activity detection with hysteresis
//! - `preprocess`: pre-emphasis, windowing, normalization and silence stripping
//! - `fbank`: FFT, mel filterbank and MFCC extraction
//! - `descriptors`: utterance-level pitch, amplitude, spectral scalars
//!
//! # Example
//!
//! ```rust
//! use vocalid_audio::fbank::Extractor;
//! use vocalid_audio::vad::{Vad, VadEvent};
//!
//! // 100 ms of loud audio opens a speech segment.
//! let mut vad = Vad::default();
//! assert_eq!(vad.process(&[2000i16; 1600]), Some(VadEvent::SpeechStart));
//!
//! // One second of audio yields a 13-coefficient utterance vector.
//! let samples: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
//! let mfcc = Extractor::default().utterance_vector(&samples);
//! assert_eq!(mfcc.len(), 13);
//! ```

mod error;

pub mod descriptors;
pub mod fbank;
pub mod pcm;
pub mod preprocess;
pub mod resample;
pub mod vad;
pub mod wav;

pub use error::AudioError;
pub use pcm::Format;
