//! WAV container for persisted utterances.
//!
//! Captured audio is stored as a canonical 44-byte-header WAV file:
//! RIFF/WAVE, a 16-byte `fmt ` chunk declaring PCM mono 16-bit at the
//! capture sample rate, and a `data` chunk whose byte length is patched
//! in once capture ends ([`WavRecorder::finalize`]).

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::AudioError;
use crate::pcm::Format;

/// Size of the canonical PCM WAV header.
pub const HEADER_LEN: usize = 44;

fn spec_for(format: Format) -> WavSpec {
    WavSpec {
        channels: format.channels(),
        sample_rate: format.sample_rate,
        bits_per_sample: format.depth(),
        sample_format: SampleFormat::Int,
    }
}

/// Incrementally writes captured buffers to a WAV file.
///
/// The header is written with placeholder lengths on creation; the RIFF
/// and `data` sizes are fixed up by [`WavRecorder::finalize`].
pub struct WavRecorder<W: Write + Seek = BufWriter<File>> {
    writer: WavWriter<W>,
    format: Format,
    samples: usize,
}

impl WavRecorder<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>, format: Format) -> Result<Self, AudioError> {
        let writer = WavWriter::create(path, spec_for(format))?;
        Ok(Self {
            writer,
            format,
            samples: 0,
        })
    }
}

impl<W: Write + Seek> WavRecorder<W> {
    /// Creates a recorder writing into an arbitrary seekable sink.
    pub fn new(sink: W, format: Format) -> Result<Self, AudioError> {
        let writer = WavWriter::new(sink, spec_for(format))?;
        Ok(Self {
            writer,
            format,
            samples: 0,
        })
    }

    /// Appends one captured buffer.
    pub fn append(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        for &s in samples {
            self.writer.write_sample(s)?;
        }
        self.samples += samples.len();
        Ok(())
    }

    /// Returns the duration recorded so far.
    pub fn duration(&self) -> Duration {
        self.format.duration_of_samples(self.samples)
    }

    /// Patches the header lengths and flushes. Returns the recorded duration.
    pub fn finalize(self) -> Result<Duration, AudioError> {
        let duration = self.duration();
        self.writer.finalize()?;
        tracing::debug!(samples = self.samples, ?duration, "wav recording finalized");
        Ok(duration)
    }
}

/// Writes `samples` to `path` as a complete WAV file.
pub fn write_wav(path: impl AsRef<Path>, samples: &[i16], format: Format) -> Result<(), AudioError> {
    let mut rec = WavRecorder::create(path, format)?;
    rec.append(samples)?;
    rec.finalize()?;
    Ok(())
}

/// Reads a mono 16-bit PCM WAV file.
pub fn read_wav(path: impl AsRef<Path>) -> Result<(Format, Vec<i16>), AudioError> {
    let reader = WavReader::open(path)?;
    decode(reader)
}

/// Reads a mono 16-bit PCM WAV stream.
pub fn read_wav_from<R: Read>(r: R) -> Result<(Format, Vec<i16>), AudioError> {
    let reader = WavReader::new(r)?;
    decode(reader)
}

fn decode<R: Read>(reader: WavReader<R>) -> Result<(Format, Vec<i16>), AudioError> {
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(AudioError::UnsupportedWav(format!(
            "expected 16-bit integer PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if spec.channels != 1 {
        return Err(AudioError::UnsupportedWav(format!(
            "expected mono, got {} channels",
            spec.channels
        )));
    }
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok((Format::mono(spec.sample_rate), samples))
}
