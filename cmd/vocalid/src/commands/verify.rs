//! Template verification command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use vocalid_voiceprint::{Enroller, MatchScore, VoiceTemplate, score_templates};

use super::{get_config, load_audio, output, print_error, print_success};
use crate::Cli;

/// Match an utterance against a stored template.
///
/// The speaker is accepted when the score reaches `speaker_threshold`.
#[derive(Args)]
pub struct VerifyCommand {
    /// Template JSON written by `enroll`
    #[arg(long)]
    template: PathBuf,

    /// WAV file to verify
    file: PathBuf,
}

#[derive(Serialize)]
struct VerifyReport {
    file: String,
    accepted: bool,
    threshold: f64,
    score: MatchScore,
}

impl VerifyCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let sample_rate = cfg.enroll.analysis.sample_rate;

        let json = std::fs::read_to_string(&self.template)
            .map_err(|e| anyhow::anyhow!("failed to read '{}': {e}", self.template.display()))?;
        let enrolled = VoiceTemplate::from_json(&json)?;
        if !enrolled.is_valid() {
            tracing::warn!(
                quality = enrolled.quality_score(),
                "stored template is invalid; every match scores 0"
            );
        }

        let samples = load_audio(&self.file, sample_rate)?;
        let probe = Enroller::new(cfg.enroll).probe(&samples)?;

        let score = score_templates(&enrolled, &probe, &cfg.weights);
        let accepted = score.total >= cfg.speaker_threshold;
        tracing::info!(score = score.total, accepted, "speaker verification");
        if accepted {
            print_success(&format!("Speaker accepted ({:.2}%)", score.total * 100.0));
        } else {
            print_error(&format!("Speaker rejected ({:.2}%)", score.total * 100.0));
        }

        output(cli).write(&VerifyReport {
            file: self.file.display().to_string(),
            accepted,
            threshold: cfg.speaker_threshold,
            score,
        })
    }
}
