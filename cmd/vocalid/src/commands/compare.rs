//! Utterance comparison command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use vocalid_voiceprint::{VoiceFeatures, compare_features};

use super::{get_config, load_audio, output};
use crate::Cli;

/// Compare the features of two utterances.
///
/// Prints a similarity in [0, 1]. No template is involved.
#[derive(Args)]
pub struct CompareCommand {
    /// First WAV file
    a: PathBuf,
    /// Second WAV file
    b: PathBuf,
}

#[derive(Serialize)]
struct CompareReport {
    a: String,
    b: String,
    similarity: f64,
}

impl CompareCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let sample_rate = cfg.enroll.analysis.sample_rate;

        let a = VoiceFeatures::extract(&load_audio(&self.a, sample_rate)?, sample_rate)?;
        let b = VoiceFeatures::extract(&load_audio(&self.b, sample_rate)?, sample_rate)?;

        output(cli).write(&CompareReport {
            a: self.a.display().to_string(),
            b: self.b.display().to_string(),
            similarity: compare_features(&a, &b),
        })
    }
}
