//! Mel-scale utilities and filterbank generation.

use std::f64::consts::PI;

/// Generates a Hamming window of the given length.
pub fn hamming_window(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Converts frequency in Hz to mel scale.
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Converts mel scale frequency back to Hz.
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Maps `num_filters + 2` mel-spaced edge frequencies over `[0, sr/2]`
/// onto power-spectrum bin indices.
///
/// `power_len` is the number of power-spectrum bins (half the FFT size).
pub fn filter_edges(num_filters: usize, power_len: usize, sample_rate: u32) -> Vec<usize> {
    let nyquist = sample_rate as f64 / 2.0;
    let mel_low = 0.0;
    let mel_high = hz_to_mel(nyquist);

    (0..num_filters + 2)
        .map(|i| {
            let mel = mel_low + (mel_high - mel_low) * i as f64 / (num_filters + 1) as f64;
            let hz = mel_to_hz(mel);
            ((power_len + 1) as f64 * hz / nyquist).floor().max(0.0) as usize
        })
        .collect()
}

/// Creates the triangular mel filterbank matrix.
///
/// Returns `[num_filters][power_len]`. Filter `m` rises over
/// `[edge[m], edge[m+1])` and falls over `[edge[m+1], edge[m+2])`; bins at
/// or beyond `power_len` are dropped and a zero-width slope contributes
/// nothing.
pub fn mel_filter_bank(num_filters: usize, power_len: usize, sample_rate: u32) -> Vec<Vec<f64>> {
    let edges = filter_edges(num_filters, power_len, sample_rate);

    let mut bank = Vec::with_capacity(num_filters);
    for m in 1..=num_filters {
        let mut filter = vec![0.0f64; power_len];
        let left = edges[m - 1];
        let center = edges[m];
        let right = edges[m + 1];

        for k in left..center.min(power_len) {
            filter[k] = (k - left) as f64 / (center - left) as f64;
        }
        for k in center..right.min(power_len) {
            filter[k] = (right - k) as f64 / (right - center) as f64;
        }
        bank.push(filter);
    }
    bank
}

/// Sums power-spectrum energy under each filter.
///
/// Always returns one energy per filter. Filters are truncated to the
/// shorter of the filter row and the power spectrum.
pub fn apply_filter_bank(bank: &[Vec<f64>], power: &[f64]) -> Vec<f64> {
    bank.iter()
        .map(|filter| filter.iter().zip(power).map(|(w, p)| w * p).sum())
        .collect()
}
