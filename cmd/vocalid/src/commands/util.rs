//! Utility functions for CLI commands.

use std::path::Path;

use vocalid_audio::{pcm, resample::resample_mono, wav::read_wav};
use vocalid_cli::{Config, Output, OutputFormat, load_config};

use crate::Cli;

/// Gets the effective configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(cli.config.as_deref())
}

/// Builds the stdout writer for the selected format.
pub fn output(cli: &Cli) -> Output {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, None)
}

/// Reads a WAV file as mono 16-bit samples at `sample_rate`.
pub fn load_audio(path: &Path, sample_rate: u32) -> anyhow::Result<Vec<i16>> {
    let (format, samples) = read_wav(path)
        .map_err(|e| anyhow::anyhow!("failed to read '{}': {e}", path.display()))?;

    if format.sample_rate == sample_rate {
        return Ok(samples);
    }

    tracing::debug!(
        file = %path.display(),
        from = format.sample_rate,
        to = sample_rate,
        "resampling"
    );
    let resampled = resample_mono(&pcm::to_f32(&samples), format.sample_rate, sample_rate)?;
    Ok(pcm::to_i16(&resampled))
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints a rejection message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m✗\x1b[0m {}", msg);
}
