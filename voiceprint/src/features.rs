//! Per-utterance acoustic summary and its compact text form.

use std::fmt;

use serde::{Deserialize, Serialize};

use vocalid_audio::descriptors::{
    average_amplitude, average_pitch, magnitude_spectrum, spectral_centroid, spectral_envelope,
    spectral_rolloff, speech_rate,
};

use crate::VoiceprintError;

/// Number of envelope values folded into the fingerprint.
const FINGERPRINT_ENVELOPE: usize = 4;

/// Scalar and spectral summary of one utterance.
///
/// Built once by [`VoiceFeatures::extract`] and read-only afterwards.
/// The compact text form (see [`VoiceFeatures::to_feature_string`]) is the
/// storage format for enrolled features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceFeatures {
    duration: f64,
    average_amplitude: f64,
    average_pitch: f64,
    speech_rate: f64,
    spectral_centroid: f64,
    spectral_rolloff: f64,
    envelope: Vec<f64>,
    fingerprint: String,
}

impl VoiceFeatures {
    /// Analyzes one utterance of 16-bit mono PCM.
    ///
    /// At least one second of audio is required.
    pub fn extract(samples: &[i16], sample_rate: u32) -> Result<Self, VoiceprintError> {
        let min_samples = sample_rate as usize;
        if samples.len() < min_samples || samples.is_empty() {
            return Err(VoiceprintError::AudioTooShort {
                min_samples,
                got_samples: samples.len(),
            });
        }

        let magnitude = magnitude_spectrum(samples);
        let mut features = Self {
            duration: samples.len() as f64 / sample_rate as f64,
            average_amplitude: average_amplitude(samples),
            average_pitch: average_pitch(samples, sample_rate),
            speech_rate: speech_rate(samples, sample_rate),
            spectral_centroid: spectral_centroid(&magnitude, sample_rate),
            spectral_rolloff: spectral_rolloff(&magnitude, sample_rate),
            envelope: spectral_envelope(&magnitude, sample_rate),
            fingerprint: String::new(),
        };
        features.fingerprint = features.compute_fingerprint();

        tracing::debug!(
            duration = features.duration,
            amplitude = features.average_amplitude,
            pitch = features.average_pitch,
            rate = features.speech_rate,
            fingerprint = %features.fingerprint,
            "features extracted"
        );
        Ok(features)
    }

    /// Utterance length in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn average_amplitude(&self) -> f64 {
        self.average_amplitude
    }

    /// Mean pitch in Hz, 0 if no window had a plausible pitch.
    pub fn average_pitch(&self) -> f64 {
        self.average_pitch
    }

    /// Voiced onsets per second.
    pub fn speech_rate(&self) -> f64 {
        self.speech_rate
    }

    pub fn spectral_centroid(&self) -> f64 {
        self.spectral_centroid
    }

    pub fn spectral_rolloff(&self) -> f64 {
        self.spectral_rolloff
    }

    /// Log spectral envelope over 12 mel bands.
    pub fn envelope(&self) -> &[f64] {
        &self.envelope
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Lossy digest of the rounded descriptors, compared position by position.
    fn compute_fingerprint(&self) -> String {
        let mut fp = String::new();
        fp.push_str(&round_fixed(self.average_pitch / 10.0, 0));
        fp.push_str(&round_fixed(self.average_amplitude / 100.0, 0));
        fp.push_str(&round_fixed(self.speech_rate, 1));
        fp.push_str(&round_fixed(self.spectral_centroid / 100.0, 0));
        for &v in self.envelope.iter().take(FINGERPRINT_ENVELOPE) {
            fp.push_str(&round_fixed(v, 1));
        }
        fp
    }

    /// Encodes as `duration,amplitude,pitch,rate,centroid,rolloff,env...,fingerprint`.
    pub fn to_feature_string(&self) -> String {
        let mut parts: Vec<String> = [
            self.duration,
            self.average_amplitude,
            self.average_pitch,
            self.speech_rate,
            self.spectral_centroid,
            self.spectral_rolloff,
        ]
        .iter()
        .chain(&self.envelope)
        .map(|v| v.to_string())
        .collect();
        parts.push(self.fingerprint.clone());
        parts.join(",")
    }

    /// Decodes the form produced by [`to_feature_string`](Self::to_feature_string).
    ///
    /// Returns `None` if a numeric field does not parse or fields are missing.
    pub fn from_feature_string(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() < 7 {
            return None;
        }
        let num = |i: usize| parts[i].trim().parse::<f64>().ok();

        let envelope = parts[6..parts.len() - 1]
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.trim().parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            duration: num(0)?,
            average_amplitude: num(1)?,
            average_pitch: num(2)?,
            speech_rate: num(3)?,
            spectral_centroid: num(4)?,
            spectral_rolloff: num(5)?,
            envelope,
            fingerprint: parts[parts.len() - 1].to_string(),
        })
    }
}

impl fmt::Display for VoiceFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VoiceFeatures{{duration={:.2}, amplitude={:.1}, pitch={:.1}, rate={:.1}}}",
            self.duration, self.average_amplitude, self.average_pitch, self.speech_rate
        )
    }
}

/// Formats with `decimals` places, rounding halves away from zero.
fn round_fixed(v: f64, decimals: usize) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (v * scale).round() / scale;
    format!("{rounded:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(freq: f64, n: usize, amp: f64) -> Vec<i16> {
        (0..n)
            .map(|i| {
                let t = i as f64 / 16000.0;
                let s = (2.0 * std::f64::consts::PI * freq * t).sin()
                    + 0.5 * (2.0 * std::f64::consts::PI * 2.0 * freq * t).sin();
                (amp * s / 1.5) as i16
            })
            .collect()
    }

    pub(crate) fn sample_features() -> VoiceFeatures {
        VoiceFeatures {
            duration: 2.0,
            average_amplitude: 1234.5,
            average_pitch: 181.0,
            speech_rate: 3.25,
            spectral_centroid: 954.0,
            spectral_rolloff: 1800.0,
            envelope: vec![12.34, 11.0, -0.05, 9.96, 8.0, 7.5],
            fingerprint: String::new(),
        }
    }

    #[test]
    fn test_round_fixed_half_away_from_zero() {
        assert_eq!(round_fixed(2.5, 0), "3");
        assert_eq!(round_fixed(-2.5, 0), "-3");
        assert_eq!(round_fixed(18.1, 0), "18");
        assert_eq!(round_fixed(3.25, 1), "3.3");
        assert_eq!(round_fixed(7.0, 1), "7.0");
    }

    #[test]
    fn test_fingerprint_layout() {
        let f = sample_features();
        // 18 | 12 | 3.3 | 10 | 12.3 11.0 -0.1 10.0
        assert_eq!(f.compute_fingerprint(), "18123.31012.311.0-0.110.0");
    }

    #[test]
    fn test_extract_rejects_short_audio() {
        let err = VoiceFeatures::extract(&[100; 15999], 16000).unwrap_err();
        assert!(matches!(
            err,
            VoiceprintError::AudioTooShort {
                min_samples: 16000,
                got_samples: 15999
            }
        ));
    }

    #[test]
    fn test_extract_voice_like_tone() {
        let samples = voice(200.0, 16000, 8000.0);
        let f = VoiceFeatures::extract(&samples, 16000).unwrap();
        assert!((f.duration() - 1.0).abs() < 1e-12);
        assert!(f.average_amplitude() > 1000.0);
        assert!((f.average_pitch() - 200.0).abs() < 10.0, "pitch {}", f.average_pitch());
        assert!(f.spectral_centroid() > 150.0 && f.spectral_centroid() < 600.0);
        assert_eq!(f.envelope().len(), 12);
        assert!(!f.fingerprint().is_empty());
        assert!(f.to_string().starts_with("VoiceFeatures{duration=1.00"));
    }

    #[test]
    fn test_feature_string_roundtrip() {
        let mut f = sample_features();
        f.fingerprint = f.compute_fingerprint();
        let encoded = f.to_feature_string();
        assert!(encoded.starts_with("2,1234.5,181,3.25,954,1800,12.34,"));
        assert!(encoded.ends_with(f.fingerprint()));
        assert_eq!(VoiceFeatures::from_feature_string(&encoded), Some(f));
    }

    #[test]
    fn test_feature_string_malformed() {
        assert_eq!(VoiceFeatures::from_feature_string(""), None);
        assert_eq!(VoiceFeatures::from_feature_string("1,2,3"), None);
        assert_eq!(VoiceFeatures::from_feature_string("1,2,x,4,5,6,fp"), None);

        let f = VoiceFeatures::from_feature_string("1,2,3,4,5,6,fp").unwrap();
        assert!(f.envelope().is_empty());
        assert_eq!(f.fingerprint(), "fp");
    }
}
