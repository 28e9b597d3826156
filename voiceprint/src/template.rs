//! Statistical voice template built from enrollment utterances.

use serde::{Deserialize, Serialize};

use vocalid_audio::descriptors::{PITCH_RANGE_HZ, zero_crossings};

use crate::VoiceprintError;

/// Minimum quality for a template to be usable.
pub const MIN_QUALITY: f64 = 0.3;

/// Constants used where the builder does not measure a value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Fundamental frequency in Hz when no pitch estimates are supplied
    /// (default: 150.0).
    pub default_fundamental_frequency: f64,
    /// Stored spectral rolloff (default: 0.85).
    pub spectral_rolloff: f64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            default_fundamental_frequency: 150.0,
            spectral_rolloff: 0.85,
        }
    }
}

/// Aggregate of per-utterance feature vectors.
///
/// Fields are private; a template is only ever produced whole by
/// [`TemplateBuilder`] (or decoded from JSON) and re-enrollment builds a
/// new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceTemplate {
    mean_features: Vec<f32>,
    std_features: Vec<f32>,
    min_features: Vec<f32>,
    max_features: Vec<f32>,
    fundamental_frequency: f64,
    spectral_centroid: f64,
    spectral_rolloff: f64,
    zero_crossing_rate: f64,
    mfcc_variance: f64,
    frame_count: usize,
    quality_score: f64,
}

impl VoiceTemplate {
    pub fn mean_features(&self) -> &[f32] {
        &self.mean_features
    }

    pub fn std_features(&self) -> &[f32] {
        &self.std_features
    }

    pub fn min_features(&self) -> &[f32] {
        &self.min_features
    }

    pub fn max_features(&self) -> &[f32] {
        &self.max_features
    }

    pub fn fundamental_frequency(&self) -> f64 {
        self.fundamental_frequency
    }

    pub fn spectral_centroid(&self) -> f64 {
        self.spectral_centroid
    }

    pub fn spectral_rolloff(&self) -> f64 {
        self.spectral_rolloff
    }

    pub fn zero_crossing_rate(&self) -> f64 {
        self.zero_crossing_rate
    }

    pub fn mfcc_variance(&self) -> f64 {
        self.mfcc_variance
    }

    /// Number of feature vectors the template was built from.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Quality in `[0, 1]`.
    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    /// A template is usable when it has features and quality above [`MIN_QUALITY`].
    pub fn is_valid(&self) -> bool {
        !self.mean_features.is_empty() && self.quality_score > MIN_QUALITY
    }

    pub fn to_json(&self) -> Result<String, VoiceprintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, VoiceprintError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Builds [`VoiceTemplate`]s.
#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    cfg: TemplateConfig,
}

impl TemplateBuilder {
    pub fn new(cfg: TemplateConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.cfg
    }

    /// Builds a template using the configured default fundamental frequency.
    pub fn build(&self, vectors: &[Vec<f32>]) -> Result<VoiceTemplate, VoiceprintError> {
        self.build_with_pitch(vectors, &[])
    }

    /// Builds a template, taking the fundamental frequency from the mean of
    /// the plausible entries of `pitches` (one estimate per utterance).
    ///
    /// The first vector fixes the template length; shorter vectors only
    /// contribute their overlapping prefix.
    pub fn build_with_pitch(
        &self,
        vectors: &[Vec<f32>],
        pitches: &[f64],
    ) -> Result<VoiceTemplate, VoiceprintError> {
        let Some(first) = vectors.first() else {
            return Err(VoiceprintError::EmptyEnrollment);
        };
        let len = first.len();
        let n = vectors.len() as f64;

        let mean = mean_features(vectors, len);
        let std = std_features(vectors, &mean);
        let (min, max) = min_max_features(vectors, len);
        let mfcc_variance = mfcc_variance(vectors, &mean);

        let template = VoiceTemplate {
            fundamental_frequency: self.fundamental_frequency(pitches),
            spectral_centroid: centroid(vectors, len, n),
            spectral_rolloff: self.cfg.spectral_rolloff,
            zero_crossing_rate: zero_crossing_rate(vectors),
            quality_score: quality_score(vectors, mfcc_variance),
            mfcc_variance,
            frame_count: vectors.len(),
            mean_features: mean,
            std_features: std,
            min_features: min,
            max_features: max,
        };

        tracing::debug!(
            frames = template.frame_count,
            dims = len,
            f0 = template.fundamental_frequency,
            variance = template.mfcc_variance,
            quality = template.quality_score,
            "template built"
        );
        Ok(template)
    }

    fn fundamental_frequency(&self, pitches: &[f64]) -> f64 {
        let plausible: Vec<f64> = pitches
            .iter()
            .copied()
            .filter(|&p| p > PITCH_RANGE_HZ.0 && p < PITCH_RANGE_HZ.1)
            .collect();
        if plausible.is_empty() {
            return self.cfg.default_fundamental_frequency;
        }
        plausible.iter().sum::<f64>() / plausible.len() as f64
    }
}

fn mean_features(vectors: &[Vec<f32>], len: usize) -> Vec<f32> {
    let mut sum = vec![0.0f64; len];
    for v in vectors {
        for (s, &x) in sum.iter_mut().zip(v) {
            *s += x as f64;
        }
    }
    let n = vectors.len() as f64;
    sum.into_iter().map(|s| (s / n) as f32).collect()
}

// Population std around the mean.
fn std_features(vectors: &[Vec<f32>], mean: &[f32]) -> Vec<f32> {
    let mut sum = vec![0.0f64; mean.len()];
    for v in vectors {
        for ((s, &x), &m) in sum.iter_mut().zip(v).zip(mean) {
            let d = x as f64 - m as f64;
            *s += d * d;
        }
    }
    let n = vectors.len() as f64;
    sum.into_iter().map(|s| (s / n).sqrt() as f32).collect()
}

fn min_max_features(vectors: &[Vec<f32>], len: usize) -> (Vec<f32>, Vec<f32>) {
    let mut min = vec![f32::INFINITY; len];
    let mut max = vec![f32::NEG_INFINITY; len];
    for v in vectors {
        for (i, &x) in v.iter().take(len).enumerate() {
            min[i] = min[i].min(x);
            max[i] = max[i].max(x);
        }
    }
    (min, max)
}

/// Index-weighted mean of the coefficients.
fn centroid(vectors: &[Vec<f32>], len: usize, n: f64) -> f64 {
    if len == 0 {
        return 0.0;
    }
    let weighted: f64 = vectors
        .iter()
        .flat_map(|v| v.iter().enumerate())
        .map(|(i, &x)| x as f64 * i as f64)
        .sum();
    weighted / (n * len as f64)
}

/// Sign changes within each vector over the total number of values.
fn zero_crossing_rate(vectors: &[Vec<f32>]) -> f64 {
    let total: usize = vectors.iter().map(Vec::len).sum();
    if total == 0 {
        return 0.0;
    }
    let crossings: usize = vectors.iter().map(|v| zero_crossings(v)).sum();
    crossings as f64 / total as f64
}

fn mfcc_variance(vectors: &[Vec<f32>], mean: &[f32]) -> f64 {
    if mean.is_empty() {
        return 0.0;
    }
    let total: f64 = vectors
        .iter()
        .map(|v| {
            v.iter()
                .zip(mean)
                .map(|(&x, &m)| {
                    let d = x as f64 - m as f64;
                    d * d
                })
                .sum::<f64>()
        })
        .sum();
    total / (vectors.len() as f64 * mean.len() as f64)
}

/// `clamp01((1 - variance + min(1, mean_square * 1000)) / 2)`.
fn quality_score(vectors: &[Vec<f32>], mfcc_variance: f64) -> f64 {
    let consistency = 1.0 - mfcc_variance;
    let (energy, count) = vectors
        .iter()
        .flatten()
        .fold((0.0f64, 0usize), |(e, c), &x| (e + x as f64 * x as f64, c + 1));
    let strength = if count > 0 {
        (energy / count as f64 * 1000.0).min(1.0)
    } else {
        0.0
    };
    ((consistency + strength) / 2.0).clamp(0.0, 1.0)
}
