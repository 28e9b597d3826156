//! Weighted similarity scoring between templates and between utterances.

use serde::{Deserialize, Serialize};

use crate::features::VoiceFeatures;
use crate::template::VoiceTemplate;

/// Weights of the template sub-scores. They sum to 1 by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    /// Cosine similarity of mean vectors (default: 0.40).
    pub mfcc: f64,
    /// Closeness of the per-coefficient std vectors (default: 0.25).
    pub statistical: f64,
    /// Fundamental frequency closeness (default: 0.15).
    pub fundamental_frequency: f64,
    /// Centroid and rolloff closeness (default: 0.10).
    pub spectral: f64,
    /// Lower of the two quality scores (default: 0.10).
    pub quality: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            mfcc: 0.40,
            statistical: 0.25,
            fundamental_frequency: 0.15,
            spectral: 0.10,
            quality: 0.10,
        }
    }
}

/// Per-component breakdown of a template comparison, already weighted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchScore {
    pub mfcc: f64,
    pub statistical: f64,
    pub fundamental_frequency: f64,
    pub spectral: f64,
    pub quality: f64,
    pub total: f64,
}

/// Scores two templates in `[0, 1]`; 0 if either is invalid.
pub fn compare_templates(a: &VoiceTemplate, b: &VoiceTemplate, weights: &MatchWeights) -> f64 {
    score_templates(a, b, weights).total
}

/// Like [`compare_templates`] but returns every weighted component.
pub fn score_templates(a: &VoiceTemplate, b: &VoiceTemplate, weights: &MatchWeights) -> MatchScore {
    if !a.is_valid() || !b.is_valid() {
        return MatchScore::default();
    }

    let mfcc = finite(cosine_similarity(a.mean_features(), b.mean_features())) * weights.mfcc;
    let statistical = finite(statistical_similarity(a.std_features(), b.std_features()))
        * weights.statistical;
    let fundamental_frequency = finite(
        (1.0 - (a.fundamental_frequency() - b.fundamental_frequency()).abs() / 100.0).max(0.0),
    ) * weights.fundamental_frequency;
    let spectral = finite(
        (1.0 - ((a.spectral_centroid() - b.spectral_centroid()).abs()
            + (a.spectral_rolloff() - b.spectral_rolloff()).abs())
            / 2.0)
            .max(0.0),
    ) * weights.spectral;
    let quality = finite(a.quality_score().min(b.quality_score())) * weights.quality;

    let total = (mfcc + statistical + fundamental_frequency + spectral + quality).clamp(0.0, 1.0);
    tracing::debug!(
        mfcc,
        statistical,
        fundamental_frequency,
        spectral,
        quality,
        total,
        "template comparison"
    );
    MatchScore {
        mfcc,
        statistical,
        fundamental_frequency,
        spectral,
        quality,
        total,
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Cosine similarity; 0 for different lengths or a zero vector.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut na = 0.0;
    let mut nb = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// `max(0, 1 - ||a - b|| / len)`, with distance 1 for different lengths.
fn statistical_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dist: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt();
    (1.0 - dist / a.len() as f64).max(0.0)
}

const AMPLITUDE_WEIGHT: f64 = 0.15;
const PITCH_WEIGHT: f64 = 0.25;
const RATE_WEIGHT: f64 = 0.10;
const CENTROID_WEIGHT: f64 = 0.15;
const ENVELOPE_WEIGHT: f64 = 0.25;
const FINGERPRINT_WEIGHT: f64 = 0.10;

/// Scores two single-utterance feature sets in `[0, 1]`.
///
/// Pitch and centroid only count when both sides measured them, and the
/// envelope only when both have the same non-zero length. The weighted sum
/// is divided by the total weight of the terms that counted, not by the
/// number of terms, so a skipped term neither raises nor lowers the score.
pub fn compare_features(a: &VoiceFeatures, b: &VoiceFeatures) -> f64 {
    let mut terms: Vec<(f64, f64)> = Vec::with_capacity(6);

    terms.push((
        ratio_similarity(a.average_amplitude(), b.average_amplitude()),
        AMPLITUDE_WEIGHT,
    ));
    if a.average_pitch() > 0.0 && b.average_pitch() > 0.0 {
        terms.push((
            ratio_similarity(a.average_pitch(), b.average_pitch()),
            PITCH_WEIGHT,
        ));
    }
    terms.push((ratio_similarity(a.speech_rate(), b.speech_rate()), RATE_WEIGHT));
    if a.spectral_centroid() > 0.0 && b.spectral_centroid() > 0.0 {
        terms.push((
            ratio_similarity(a.spectral_centroid(), b.spectral_centroid()),
            CENTROID_WEIGHT,
        ));
    }
    if !a.envelope().is_empty() && a.envelope().len() == b.envelope().len() {
        terms.push((
            envelope_similarity(a.envelope(), b.envelope()),
            ENVELOPE_WEIGHT,
        ));
    }
    terms.push((
        fingerprint_similarity(a.fingerprint(), b.fingerprint()),
        FINGERPRINT_WEIGHT,
    ));

    let weight: f64 = terms.iter().map(|(_, w)| w).sum();
    let sum: f64 = terms.iter().map(|(s, w)| finite(*s) * w).sum();
    let score = (sum / weight).clamp(0.0, 1.0);
    tracing::debug!(terms = terms.len(), score, "feature comparison");
    score
}

/// `1 - |x - y| / max(x, y)`; 1 when both are zero.
fn ratio_similarity(x: f64, y: f64) -> f64 {
    let max = x.max(y);
    if max <= 0.0 {
        return if x == y { 1.0 } else { 0.0 };
    }
    1.0 - (x - y).abs() / max
}

fn envelope_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dist: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt();
    (-dist / 10.0).exp()
}

/// Fraction of positions holding the same character; 0 for different lengths.
fn fingerprint_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() != b.len() {
        return 0.0;
    }
    if a.is_empty() {
        return 1.0;
    }
    let matches = a.iter().zip(&b).filter(|(x, y)| x == y).count();
    matches as f64 / a.len() as f64
}
