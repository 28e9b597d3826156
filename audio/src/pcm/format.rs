//! PCM audio format definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Describes a 16-bit signed little-endian mono PCM stream.
///
/// Voice analysis only ever works on mono audio, so the channel count is
/// fixed; the sample rate is the only free parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Sample rate in Hz (e.g., 16000).
    pub sample_rate: u32,
}

impl Format {
    /// Creates a mono format with the given sample rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Returns the number of channels (always 1).
    pub fn channels(&self) -> u16 {
        1
    }

    /// Returns the bit depth (always 16).
    pub fn depth(&self) -> u16 {
        16
    }

    /// Returns the number of bytes per sample frame.
    pub fn sample_bytes(&self) -> usize {
        2
    }

    /// Returns the byte rate (bytes per second).
    pub fn bytes_rate(&self) -> u64 {
        self.sample_rate as u64 * self.sample_bytes() as u64
    }

    /// Returns the number of samples covering `duration`.
    pub fn samples_in_duration(&self, duration: Duration) -> usize {
        (self.sample_rate as u128 * duration.as_millis() / 1000) as usize
    }

    /// Returns the number of bytes covering `duration`.
    pub fn bytes_in_duration(&self, duration: Duration) -> u64 {
        self.samples_in_duration(duration) as u64 * self.sample_bytes() as u64
    }

    /// Returns the playback duration of `samples` samples.
    pub fn duration_of_samples(&self, samples: usize) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(samples as u64 * 1_000_000 / self.sample_rate as u64)
    }

    /// Returns the number of samples in `bytes` bytes of PCM data.
    pub fn samples(&self, bytes: u64) -> u64 {
        bytes / self.sample_bytes() as u64
    }
}

impl Format {
    /// 16kHz mono, the rate every analysis default assumes.
    pub const MONO_16K: Format = Format::mono(16000);
    /// 44.1kHz mono.
    pub const MONO_44K: Format = Format::mono(44100);
    /// 48kHz mono.
    pub const MONO_48K: Format = Format::mono(48000);
}

impl Default for Format {
    fn default() -> Self {
        Self::MONO_16K
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_properties() {
        let format = Format::MONO_16K;
        assert_eq!(format.sample_rate, 16000);
        assert_eq!(format.channels(), 1);
        assert_eq!(format.depth(), 16);
        assert_eq!(format.bytes_rate(), 32000);
    }

    #[test]
    fn test_bytes_in_duration() {
        let format = Format::MONO_16K;
        assert_eq!(format.bytes_in_duration(Duration::from_secs(1)), 32000);
        assert_eq!(format.bytes_in_duration(Duration::from_millis(100)), 3200);
        assert_eq!(format.samples_in_duration(Duration::from_millis(100)), 1600);
    }

    #[test]
    fn test_duration_of_samples() {
        let format = Format::MONO_16K;
        assert_eq!(format.duration_of_samples(16000), Duration::from_secs(1));
        assert_eq!(format.duration_of_samples(1600), Duration::from_millis(100));
        assert_eq!(Format::mono(0).duration_of_samples(10), Duration::ZERO);
    }

    #[test]
    fn test_samples() {
        assert_eq!(Format::MONO_16K.samples(32000), 16000);
    }
}
