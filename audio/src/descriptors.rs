//! Scalar acoustic descriptors over a whole utterance.
//!
//! These work on raw 16-bit samples (amplitude-dependent thresholds are
//! expressed in 16-bit units) and on the utterance magnitude spectrum.

use std::f64::consts::PI;

use crate::fbank::{hamming_window, hz_to_mel};

/// Pitch analysis window in samples.
pub const PITCH_FRAME: usize = 512;
/// Hop between pitch analysis windows.
pub const PITCH_HOP: usize = PITCH_FRAME / 2;
/// Smallest autocorrelation lag considered.
pub const PITCH_MIN_LAG: usize = 20;
/// Plausible fundamental-frequency range (exclusive) in Hz.
pub const PITCH_RANGE_HZ: (f64, f64) = (50.0, 800.0);
/// Fraction of spectral energy below the rolloff frequency.
pub const ROLLOFF_FRACTION: f64 = 0.85;
/// Stride used when counting voiced onsets for the speech rate.
const SPEECH_RATE_STRIDE: usize = 160;
/// Number of spectral-envelope bands.
pub const ENVELOPE_BANDS: usize = 12;

/// Mean absolute amplitude.
pub fn average_amplitude(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64).abs()).sum();
    sum / samples.len() as f64
}

/// Fraction of adjacent pairs that change sign, over the whole buffer.
///
/// A crossing is counted when a sample moves from `<= 0` to `> 0` or back.
/// The count is divided by the number of values, not the number of pairs.
pub fn zero_crossing_rate(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    zero_crossings(values) as f64 / values.len() as f64
}

/// Number of adjacent pairs that change sign.
pub fn zero_crossings(values: &[f32]) -> usize {
    values
        .windows(2)
        .filter(|w| (w[1] > 0.0 && w[0] <= 0.0) || (w[1] <= 0.0 && w[0] > 0.0))
        .count()
}

/// Estimates the pitch of one window from its autocorrelation peak.
///
/// Searches lags in `[20, len/2)` for the largest positive correlation and
/// returns `sample_rate / lag`, or 0 when nothing correlates.
pub fn estimate_pitch(frame: &[i16], sample_rate: u32) -> f64 {
    let n = frame.len();
    let mut best_corr = 0.0;
    let mut best_lag = 0;
    for lag in PITCH_MIN_LAG..n / 2 {
        let corr: f64 = frame[..n - lag]
            .iter()
            .zip(&frame[lag..])
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum();
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }
    if best_lag > 0 {
        sample_rate as f64 / best_lag as f64
    } else {
        0.0
    }
}

/// Averages plausible per-window pitch estimates over the utterance.
///
/// Windows of [`PITCH_FRAME`] samples start every [`PITCH_HOP`] samples
/// while a full window plus at least one sample remains. Estimates
/// outside [`PITCH_RANGE_HZ`] are discarded; returns 0 if none survive.
pub fn average_pitch(samples: &[i16], sample_rate: u32) -> f64 {
    let mut pitches = Vec::new();
    let mut i = 0;
    while i + PITCH_FRAME < samples.len() {
        let p = estimate_pitch(&samples[i..i + PITCH_FRAME], sample_rate);
        if p > PITCH_RANGE_HZ.0 && p < PITCH_RANGE_HZ.1 {
            pitches.push(p);
        }
        i += PITCH_HOP;
    }
    if pitches.is_empty() {
        return 0.0;
    }
    pitches.iter().sum::<f64>() / pitches.len() as f64
}

/// Voiced onsets per second.
///
/// Every 160th sample is classified as silent when its magnitude is below
/// a tenth of the average amplitude; silent-to-voiced transitions are
/// counted and divided by the utterance duration.
pub fn speech_rate(samples: &[i16], sample_rate: u32) -> f64 {
    if samples.is_empty() || sample_rate == 0 {
        return 0.0;
    }
    let threshold = (average_amplitude(samples) * 0.1) as i32;
    let mut transitions = 0;
    let mut was_silent = true;
    for &s in samples.iter().step_by(SPEECH_RATE_STRIDE) {
        let silent = (s as i32).abs() < threshold;
        if was_silent && !silent {
            transitions += 1;
        }
        was_silent = silent;
    }
    let duration = samples.len() as f64 / sample_rate as f64;
    transitions as f64 / duration
}

/// Magnitude spectrum of the Hamming-windowed utterance.
///
/// Uses a direct DFT so any length is accepted; returns `len / 2` bins.
/// Cost is quadratic in the utterance length.
pub fn magnitude_spectrum(samples: &[i16]) -> Vec<f64> {
    let n = samples.len();
    let window = hamming_window(n);
    let windowed: Vec<f64> = samples
        .iter()
        .zip(&window)
        .map(|(&s, &w)| s as f64 * w)
        .collect();

    // Twiddle table: angle(k * t) only depends on (k * t) mod n.
    let (cos_t, sin_t): (Vec<f64>, Vec<f64>) = (0..n)
        .map(|m| {
            let angle = -2.0 * PI * m as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .unzip();

    (0..n / 2)
        .map(|k| {
            let (mut re, mut im) = (0.0, 0.0);
            let mut idx = 0;
            for &x in &windowed {
                re += x * cos_t[idx];
                im += x * sin_t[idx];
                idx += k;
                if idx >= n {
                    idx -= n;
                }
            }
            re.hypot(im)
        })
        .collect()
}

/// Frequency in Hz of magnitude bin `i` out of `bins`.
fn bin_frequency(i: usize, bins: usize, sample_rate: u32) -> f64 {
    i as f64 * sample_rate as f64 / (2 * bins) as f64
}

/// Magnitude-weighted mean frequency; 0 for an empty or silent spectrum.
pub fn spectral_centroid(magnitude: &[f64], sample_rate: u32) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (i, &m) in magnitude.iter().enumerate() {
        weighted += bin_frequency(i, magnitude.len(), sample_rate) * m;
        total += m;
    }
    if total > 0.0 { weighted / total } else { 0.0 }
}

/// Frequency below which [`ROLLOFF_FRACTION`] of the spectral energy lies.
pub fn spectral_rolloff(magnitude: &[f64], sample_rate: u32) -> f64 {
    let total: f64 = magnitude.iter().map(|m| m * m).sum();
    let threshold = ROLLOFF_FRACTION * total;
    let mut cumulative = 0.0;
    for (i, &m) in magnitude.iter().enumerate() {
        cumulative += m * m;
        if cumulative >= threshold {
            return bin_frequency(i, magnitude.len(), sample_rate);
        }
    }
    0.0
}

/// Coarse log spectral envelope: Gaussian bands 300 mel apart, 100 mel wide.
///
/// Band `i` sums the magnitude spectrum weighted by
/// `exp(-0.5 * ((mel(f) - 300 i) / 100)^2)`, then takes `ln(sum + 1e-10)`.
pub fn spectral_envelope(magnitude: &[f64], sample_rate: u32) -> Vec<f64> {
    let bins = magnitude.len();
    (0..ENVELOPE_BANDS)
        .map(|i| {
            let center = i as f64 * 300.0;
            let sum: f64 = magnitude
                .iter()
                .enumerate()
                .map(|(j, &m)| {
                    let mel = hz_to_mel(bin_frequency(j, bins, sample_rate));
                    let z = (mel - center) / 100.0;
                    m * (-0.5 * z * z).exp()
                })
                .sum();
            (sum + 1e-10).ln()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, n: usize, amp: f64) -> Vec<i16> {
        (0..n)
            .map(|i| (amp * (2.0 * PI * freq * i as f64 / 16000.0).sin()) as i16)
            .collect()
    }

    #[test]
    fn test_average_amplitude() {
        assert_eq!(average_amplitude(&[100, -100, 300, -300]), 200.0);
        assert_eq!(average_amplitude(&[]), 0.0);
        assert_eq!(average_amplitude(&[i16::MIN]), 32768.0);
    }

    #[test]
    fn test_zero_crossing_rate() {
        assert_eq!(zero_crossing_rate(&[1.0, -1.0, 1.0, -1.0]), 0.75);
        assert_eq!(zero_crossing_rate(&[1.0, 1.0, 1.0, 1.0]), 0.0);
        // Zero counts as non-positive.
        assert_eq!(zero_crossing_rate(&[0.0, 0.0, 1.0, 0.0]), 0.5);
        assert_eq!(zero_crossing_rate(&[]), 0.0);
    }

    #[test]
    fn test_estimate_pitch_200hz() {
        // 200 Hz at 16 kHz repeats every 80 samples.
        let frame = tone(200.0, PITCH_FRAME, 8000.0);
        let p = estimate_pitch(&frame, 16000);
        assert!((p - 200.0).abs() < 5.0, "expected ~200 Hz, got {p}");
    }

    #[test]
    fn test_estimate_pitch_silence() {
        assert_eq!(estimate_pitch(&[0; PITCH_FRAME], 16000), 0.0);
        assert_eq!(estimate_pitch(&[100; 30], 16000), 0.0);
    }

    #[test]
    fn test_average_pitch() {
        let samples = tone(250.0, 16000, 8000.0);
        let p = average_pitch(&samples, 16000);
        assert!((p - 250.0).abs() < 10.0, "expected ~250 Hz, got {p}");
        assert_eq!(average_pitch(&[0; 16000], 16000), 0.0);
        assert_eq!(average_pitch(&[0; 100], 16000), 0.0);
    }

    #[test]
    fn test_speech_rate_bursts() {
        // 4 bursts of 0.1 s separated by 0.15 s of silence in 1 s.
        let mut samples = Vec::new();
        for _ in 0..4 {
            samples.extend(std::iter::repeat_n(5000i16, 1600));
            samples.extend(std::iter::repeat_n(0i16, 2400));
        }
        assert_eq!(samples.len(), 16000);
        let rate = speech_rate(&samples, 16000);
        assert!((rate - 4.0).abs() < 1e-9, "expected 4 onsets/s, got {rate}");
        assert_eq!(speech_rate(&[], 16000), 0.0);
    }

    #[test]
    fn test_magnitude_spectrum_peak() {
        // 1000 Hz over 800 samples lands on bin 50 (20 Hz per bin).
        let samples = tone(1000.0, 800, 8000.0);
        let mag = magnitude_spectrum(&samples);
        assert_eq!(mag.len(), 400);
        let peak = mag
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 50);
    }

    #[test]
    fn test_centroid_and_rolloff_follow_tone() {
        let mag = magnitude_spectrum(&tone(1000.0, 800, 8000.0));
        let centroid = spectral_centroid(&mag, 16000);
        let rolloff = spectral_rolloff(&mag, 16000);
        assert!((centroid - 1000.0).abs() < 150.0, "centroid {centroid}");
        assert!((rolloff - 1000.0).abs() < 50.0, "rolloff {rolloff}");
    }

    #[test]
    fn test_silent_spectrum_descriptors() {
        let mag = magnitude_spectrum(&[0; 256]);
        assert_eq!(spectral_centroid(&mag, 16000), 0.0);
        // Zero total energy: the first bin already meets the threshold.
        assert_eq!(spectral_rolloff(&mag, 16000), 0.0);
        assert_eq!(spectral_centroid(&[], 16000), 0.0);
        assert_eq!(spectral_rolloff(&[], 16000), 0.0);
    }

    #[test]
    fn test_spectral_envelope_shape() {
        let mag = magnitude_spectrum(&tone(440.0, 1024, 8000.0));
        let env = spectral_envelope(&mag, 16000);
        assert_eq!(env.len(), ENVELOPE_BANDS);
        assert!(env.iter().all(|v| v.is_finite()));

        let silent = spectral_envelope(&[0.0; 64], 16000);
        assert!(silent.iter().all(|&v| (v - (1e-10f64).ln()).abs() < 1e-9));
    }
}
