//! Enrollment: utterances in, template out.
//!
//! Each utterance is preprocessed and reduced to its mean MFCC vector plus
//! a pitch estimate. Utterances are independent, so enrollment analyzes
//! them on the blocking pool in parallel and joins before building.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vocalid_audio::descriptors::average_pitch;
use vocalid_audio::fbank::{AnalysisConfig, Extractor};
use vocalid_audio::pcm;
use vocalid_audio::preprocess::{PreprocessConfig, preprocess};

use crate::template::{TemplateBuilder, TemplateConfig, VoiceTemplate};
use crate::VoiceprintError;

/// Settings for the acoustic side of enrollment and verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollConfig {
    pub analysis: AnalysisConfig,
    pub preprocess: PreprocessConfig,
    pub template: TemplateConfig,
}

/// Result of analyzing one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Mean MFCC vector over the utterance's frames.
    pub vector: Vec<f32>,
    /// Average pitch in Hz of the raw samples, 0 if unvoiced.
    pub pitch: f64,
}

/// Analyzes utterances and builds templates from them.
pub struct Enroller {
    preprocess: PreprocessConfig,
    extractor: Arc<Extractor>,
    builder: TemplateBuilder,
}

impl Enroller {
    pub fn new(cfg: EnrollConfig) -> Self {
        Self {
            preprocess: cfg.preprocess,
            extractor: Arc::new(Extractor::new(cfg.analysis)),
            builder: TemplateBuilder::new(cfg.template),
        }
    }

    /// Analyzes one utterance on the calling thread.
    pub fn analyze(&self, samples: &[i16]) -> Result<Utterance, VoiceprintError> {
        analyze_utterance(&self.extractor, &self.preprocess, samples)
    }

    /// Analyzes all utterances concurrently and builds a template.
    ///
    /// Fails on the first utterance that cannot be analyzed.
    pub async fn enroll(&self, utterances: Vec<Vec<i16>>) -> Result<VoiceTemplate, VoiceprintError> {
        if utterances.is_empty() {
            return Err(VoiceprintError::EmptyEnrollment);
        }

        let tasks = utterances.into_iter().map(|samples| {
            let extractor = Arc::clone(&self.extractor);
            let pre = self.preprocess.clone();
            tokio::task::spawn_blocking(move || analyze_utterance(&extractor, &pre, &samples))
        });

        let mut vectors = Vec::new();
        let mut pitches = Vec::new();
        for joined in futures::future::join_all(tasks).await {
            let utterance = joined??;
            vectors.push(utterance.vector);
            pitches.push(utterance.pitch);
        }

        let template = self.builder.build_with_pitch(&vectors, &pitches)?;
        tracing::info!(
            utterances = vectors.len(),
            quality = template.quality_score(),
            valid = template.is_valid(),
            "enrollment complete"
        );
        Ok(template)
    }

    /// Builds a single-utterance template to compare against an enrolled one.
    pub fn probe(&self, samples: &[i16]) -> Result<VoiceTemplate, VoiceprintError> {
        let utterance = self.analyze(samples)?;
        self.builder
            .build_with_pitch(&[utterance.vector], &[utterance.pitch])
    }
}

impl Default for Enroller {
    fn default() -> Self {
        Self::new(EnrollConfig::default())
    }
}

fn analyze_utterance(
    extractor: &Extractor,
    pre: &PreprocessConfig,
    samples: &[i16],
) -> Result<Utterance, VoiceprintError> {
    let min_samples = extractor.config().sample_rate as usize;
    if samples.len() < min_samples || samples.is_empty() {
        return Err(VoiceprintError::AudioTooShort {
            min_samples,
            got_samples: samples.len(),
        });
    }

    let pitch = average_pitch(samples, extractor.config().sample_rate);
    let cleaned = preprocess(&pcm::to_f32(samples), pre);
    let vector = extractor.utterance_vector(&cleaned);
    if vector.is_empty() {
        tracing::warn!(kept = cleaned.len(), "utterance is silence after preprocessing");
        return Err(VoiceprintError::AudioTooShort {
            min_samples,
            got_samples: cleaned.len(),
        });
    }

    tracing::debug!(samples = samples.len(), kept = cleaned.len(), pitch, "utterance analyzed");
    Ok(Utterance { vector, pitch })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(freq: f64, n: usize) -> Vec<i16> {
        (0..n)
            .map(|i| {
                let t = i as f64 / 16000.0;
                let s = (2.0 * std::f64::consts::PI * freq * t).sin()
                    + 0.3 * (2.0 * std::f64::consts::PI * 3.0 * freq * t).sin();
                (6000.0 * s) as i16
            })
            .collect()
    }

    #[test]
    fn test_analyze_utterance() {
        let enroller = Enroller::default();
        let u = enroller.analyze(&voice(160.0, 16000)).unwrap();
        assert_eq!(u.vector.len(), 13);
        assert!(u.vector.iter().all(|v| v.is_finite()));
        assert!((u.pitch - 160.0).abs() < 10.0, "pitch {}", u.pitch);
    }

    #[test]
    fn test_analyze_rejects_short_audio() {
        let enroller = Enroller::default();
        assert!(matches!(
            enroller.analyze(&voice(160.0, 8000)),
            Err(VoiceprintError::AudioTooShort {
                min_samples: 16000,
                got_samples: 8000
            })
        ));
    }

    #[test]
    fn test_probe_is_valid() {
        let enroller = Enroller::default();
        let t = enroller.probe(&voice(160.0, 16000)).unwrap();
        assert_eq!(t.frame_count(), 1);
        assert_eq!(t.quality_score(), 1.0);
        assert!(t.is_valid());
    }

    #[tokio::test]
    async fn test_enroll_empty() {
        let enroller = Enroller::default();
        assert!(matches!(
            enroller.enroll(Vec::new()).await,
            Err(VoiceprintError::EmptyEnrollment)
        ));
    }

    #[tokio::test]
    async fn test_enroll_propagates_short_utterance() {
        let enroller = Enroller::default();
        let result = enroller
            .enroll(vec![voice(160.0, 16000), voice(160.0, 100)])
            .await;
        assert!(matches!(result, Err(VoiceprintError::AudioTooShort { .. })));
    }

    #[tokio::test]
    async fn test_enroll_repeated_utterance() {
        let enroller = Enroller::default();
        let samples = voice(160.0, 16000);
        let t = enroller
            .enroll(vec![samples.clone(), samples.clone(), samples])
            .await
            .unwrap();
        assert_eq!(t.frame_count(), 3);
        assert!(t.mfcc_variance() < 1e-6);
        assert!(t.is_valid());
        assert!((t.fundamental_frequency() - 160.0).abs() < 10.0);
    }
}
