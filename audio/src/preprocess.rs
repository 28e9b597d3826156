//! Utterance preprocessing: pre-emphasis, windowing, peak normalization
//! and silence stripping, applied in that order.
//!
//! Every step is a pure function over a whole utterance.

use serde::{Deserialize, Serialize};

use crate::fbank::hamming_window;

/// Configuration for [`preprocess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Pre-emphasis coefficient (default: 0.97).
    pub pre_emphasis: f32,
    /// Post-normalization amplitude at or below which a sample counts as
    /// silence (default: 0.02).
    pub silence_threshold: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            pre_emphasis: 0.97,
            silence_threshold: 0.02,
        }
    }
}

/// Runs the full preprocessing chain on one utterance.
pub fn preprocess(signal: &[f32], cfg: &PreprocessConfig) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }
    let emphasized = pre_emphasis(signal, cfg.pre_emphasis);
    let windowed = apply_hamming(&emphasized);
    let normalized = normalize_peak(&windowed);
    strip_silence(&normalized, cfg.silence_threshold)
}

/// `y[0] = x[0]`, `y[i] = x[i] - coeff * x[i-1]`.
pub fn pre_emphasis(signal: &[f32], coeff: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(signal.len());
    if let Some(&first) = signal.first() {
        out.push(first);
    }
    for pair in signal.windows(2) {
        out.push(pair[1] - coeff * pair[0]);
    }
    out
}

/// Multiplies the whole signal by a Hamming window of the same length.
pub fn apply_hamming(signal: &[f32]) -> Vec<f32> {
    hamming_window(signal.len())
        .into_iter()
        .zip(signal)
        .map(|(w, &s)| (s as f64 * w) as f32)
        .collect()
}

/// Divides every sample by the peak absolute value.
///
/// An all-zero signal is returned unchanged.
pub fn normalize_peak(signal: &[f32]) -> Vec<f32> {
    let peak = signal.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    if peak == 0.0 {
        return signal.to_vec();
    }
    signal.iter().map(|&s| s / peak).collect()
}

/// Keeps only samples whose magnitude exceeds `threshold`.
///
/// If nothing exceeds it the input is returned unchanged, so a non-empty
/// signal never becomes empty.
pub fn strip_silence(signal: &[f32], threshold: f32) -> Vec<f32> {
    let active: Vec<f32> = signal
        .iter()
        .copied()
        .filter(|s| s.abs() > threshold)
        .collect();
    if active.is_empty() {
        return signal.to_vec();
    }
    active
}
