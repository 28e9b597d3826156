//! Enrollment command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use vocalid_voiceprint::{Enroller, MIN_QUALITY};

use super::{get_config, load_audio, output, print_success};
use crate::Cli;

/// Build a voice template from several utterances.
///
/// Utterances are analyzed in parallel. The template is written as JSON
/// only when its quality reaches the minimum.
#[derive(Args)]
pub struct EnrollCommand {
    /// WAV files of the same speaker, one utterance each
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Where to write the template JSON
    #[arg(short = 'o', long)]
    output: PathBuf,
}

#[derive(Serialize)]
struct EnrollReport {
    template: String,
    utterances: usize,
    quality: f64,
    fundamental_frequency: f64,
    mfcc_variance: f64,
}

impl EnrollCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let sample_rate = cfg.enroll.analysis.sample_rate;

        let mut utterances = Vec::with_capacity(self.files.len());
        for file in &self.files {
            utterances.push(load_audio(file, sample_rate)?);
        }

        let enroller = Enroller::new(cfg.enroll);
        let template = enroller.enroll(utterances).await?;
        if !template.is_valid() {
            anyhow::bail!(
                "template quality {:.3} is below the minimum {MIN_QUALITY}",
                template.quality_score()
            );
        }

        std::fs::write(&self.output, template.to_json()?)?;
        print_success(&format!("Template written to {}", self.output.display()));

        output(cli).write(&EnrollReport {
            template: self.output.display().to_string(),
            utterances: template.frame_count(),
            quality: template.quality_score(),
            fundamental_frequency: template.fundamental_frequency(),
            mfcc_variance: template.mfcc_variance(),
        })
    }
}
