//! Sample-rate conversion for stored utterances.
//!
//! Analysis assumes a fixed rate (16 kHz). Utterances stored at another
//! rate are converted with rubato's FFT resampler before analysis.

use rubato::{FftFixedInOut, Resampler};

use crate::AudioError;

/// Frames per processing block.
const CHUNK_SIZE: usize = 1024;

/// Resamples mono f32 audio from `from_rate` to `to_rate`.
///
/// Returns the input unchanged when the rates are equal. The resampler's
/// group delay is trimmed so the output lines up with the input.
pub fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resample(format!(
            "invalid sample rates {from_rate} -> {to_rate}"
        )));
    }

    let mut resampler = FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1)?;
    let delay = resampler.output_delay();
    let expected = (samples.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;

    let mut out: Vec<f32> = Vec::with_capacity(expected + delay);
    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let chunk: &[&[f32]] = &[&samples[pos..pos + n]];
        let block = resampler.process(chunk, None)?;
        out.extend_from_slice(&block[0]);
        pos += n;
    }
    if pos < samples.len() {
        let tail: &[&[f32]] = &[&samples[pos..]];
        let block = resampler.process_partial(Some(tail), None)?;
        out.extend_from_slice(&block[0]);
    }
    // Flush until the delayed tail is out.
    while out.len() < expected + delay {
        let block = resampler.process_partial::<&[f32]>(None, None)?;
        if block[0].is_empty() {
            break;
        }
        out.extend_from_slice(&block[0]);
    }

    let start = delay.min(out.len());
    let end = (start + expected).min(out.len());
    Ok(out[start..end].to_vec())
}
