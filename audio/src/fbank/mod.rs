//! MFCC feature extraction.
//!
//! Per frame: FFT -> power spectrum -> mel filterbank -> log -> DCT-II.
//!
//! Default parameters:
//! - SampleRate: 16000
//! - FrameSize: 1024
//! - HopSize: 512
//! - NumFilters: 26
//! - NumMfcc: 13
//! - EnergyFloor: 1e-10

pub mod fft;
pub mod mel;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub use fft::{Spectrum, fft, fft_real, next_pow2};
pub use mel::{apply_filter_bank, hamming_window, hz_to_mel, mel_filter_bank, mel_to_hz};

/// Frames shorter than this produce no coefficients.
pub const MIN_FRAME_LEN: usize = 64;

/// Configuration for frame analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input sample rate in Hz (default: 16000).
    pub sample_rate: u32,
    /// Frame length in samples (default: 1024).
    pub frame_size: usize,
    /// Hop between frame starts in samples (default: 512).
    pub hop_size: usize,
    /// Number of triangular mel filters (default: 26).
    pub num_filters: usize,
    /// Number of cepstral coefficients kept (default: 13).
    pub num_mfcc: usize,
    /// Floor applied before the log (default: 1e-10).
    pub energy_floor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            frame_size: 1024,
            hop_size: 512,
            num_filters: 26,
            num_mfcc: 13,
            energy_floor: 1e-10,
        }
    }
}

/// MFCC extractor with a cached filterbank for the configured frame size.
pub struct Extractor {
    cfg: AnalysisConfig,
    fft_size: usize,
    mel_bank: Vec<Vec<f64>>,
}

impl Extractor {
    /// Creates a new extractor with the given config.
    pub fn new(cfg: AnalysisConfig) -> Self {
        let fft_size = next_pow2(cfg.frame_size.max(MIN_FRAME_LEN));
        let mel_bank = mel_filter_bank(cfg.num_filters, fft_size / 2, cfg.sample_rate);
        Self {
            cfg,
            fft_size,
            mel_bank,
        }
    }

    /// Returns the extractor configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.cfg
    }

    /// Extracts MFCCs from a single frame.
    ///
    /// Frames shorter than [`MIN_FRAME_LEN`] yield an empty vector. Frames
    /// whose length is not a power of two are zero-padded to the next one.
    pub fn extract_mfcc(&self, frame: &[f32]) -> Vec<f32> {
        if frame.len() < MIN_FRAME_LEN {
            return Vec::new();
        }

        let n = next_pow2(frame.len());
        let mut padded = frame.to_vec();
        padded.resize(n, 0.0);

        let spectrum = match fft_real(&padded) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("mfcc: {e}");
                return Vec::new();
            }
        };
        let power = spectrum.power();

        let energies = if n == self.fft_size {
            apply_filter_bank(&self.mel_bank, &power)
        } else {
            let bank = mel_filter_bank(self.cfg.num_filters, power.len(), self.cfg.sample_rate);
            apply_filter_bank(&bank, &power)
        };

        let log_mel = log_compress(&energies, self.cfg.energy_floor);
        dct(&log_mel, self.cfg.num_mfcc)
    }

    /// Splits an utterance into frames and extracts MFCCs from each.
    ///
    /// Returns `[T][num_mfcc]` where `T = (len - frame_size) / hop_size + 1`.
    /// An utterance shorter than one frame but at least [`MIN_FRAME_LEN`]
    /// samples long is analyzed as a single (padded) frame.
    pub fn analyze(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let cfg = &self.cfg;
        if samples.len() < MIN_FRAME_LEN || cfg.hop_size == 0 || cfg.frame_size == 0 {
            return Vec::new();
        }
        if samples.len() < cfg.frame_size {
            return vec![self.extract_mfcc(samples)];
        }

        let num_frames = (samples.len() - cfg.frame_size) / cfg.hop_size + 1;
        (0..num_frames)
            .map(|t| {
                let start = t * cfg.hop_size;
                self.extract_mfcc(&samples[start..start + cfg.frame_size])
            })
            .collect()
    }

    /// Returns the mean MFCC vector of an utterance.
    ///
    /// This is the utterance's feature vector for enrollment. Empty if the
    /// utterance is too short to analyze.
    pub fn utterance_vector(&self, samples: &[f32]) -> Vec<f32> {
        mean_vector(&self.analyze(samples))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Natural log of each energy, floored to avoid `ln(0)`.
pub fn log_compress(energies: &[f64], floor: f64) -> Vec<f64> {
    energies.iter().map(|&e| e.max(floor).ln()).collect()
}

/// DCT-II: `c[k] = sum_j x[j] * cos(pi * k * (j + 0.5) / len)` for `k < num_coeffs`.
pub fn dct(log_mel: &[f64], num_coeffs: usize) -> Vec<f32> {
    let n = log_mel.len();
    (0..num_coeffs)
        .map(|k| {
            let mut sum = 0.0;
            for (j, &v) in log_mel.iter().enumerate() {
                sum += v * (PI * k as f64 * (j as f64 + 0.5) / n as f64).cos();
            }
            sum as f32
        })
        .collect()
}

/// Element-wise mean of equal-length vectors, aligned to the first.
fn mean_vector(frames: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let mut mean = vec![0.0f64; first.len()];
    for f in frames {
        for (m, &v) in mean.iter_mut().zip(f) {
            *m += v as f64;
        }
    }
    let t = frames.len() as f64;
    mean.into_iter().map(|m| (m / t) as f32).collect()
}
