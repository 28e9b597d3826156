//! PCM (Pulse Code Modulation) sample handling.
//!
//! Capture hands the pipeline signed 16-bit samples; the analysis stages
//! work on `f32` samples normalized to `[-1, 1]`. This module holds the
//! format description and the conversions between the two.

mod format;

pub use format::Format;

/// Scale used to map i16 samples onto `[-1, 1]`.
pub const I16_SCALE: f32 = 32768.0;

/// Converts i16 samples to f32 in `[-1, 1]`.
pub fn to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / I16_SCALE).collect()
}

/// Converts normalized f32 samples back to i16, clamping out-of-range values.
pub fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * I16_SCALE).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

/// Decodes little-endian PCM16 bytes. A trailing odd byte is ignored.
pub fn samples_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Encodes samples as little-endian PCM16 bytes.
pub fn samples_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}
