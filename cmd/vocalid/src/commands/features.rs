//! Feature extraction command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use vocalid_voiceprint::VoiceFeatures;

use super::{get_config, load_audio, output};
use crate::Cli;

/// Print acoustic features of one utterance.
///
/// The utterance must be at least one second long.
#[derive(Args)]
pub struct FeaturesCommand {
    /// WAV file to analyze
    file: PathBuf,
}

#[derive(Serialize)]
struct FeaturesReport<'a> {
    file: String,
    features: &'a VoiceFeatures,
    encoded: String,
}

impl FeaturesCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let sample_rate = cfg.enroll.analysis.sample_rate;
        let samples = load_audio(&self.file, sample_rate)?;

        let features = VoiceFeatures::extract(&samples, sample_rate)?;
        output(cli).write(&FeaturesReport {
            file: self.file.display().to_string(),
            features: &features,
            encoded: features.to_feature_string(),
        })
    }
}
