//! Passphrase commands.

use clap::Args;
use serde::Serialize;

use vocalid_passphrase::PassphraseVerifier;

use super::{get_config, output, print_error, print_success};
use crate::Cli;

/// Check or pick spoken passphrases.
///
/// With --expected and --recognized, scores recognized text against the
/// expected phrase. --random picks a phrase from the catalog; --check
/// tests text against every catalog phrase.
#[derive(Args)]
pub struct PassphraseCommand {
    /// Phrase the user was asked to say
    #[arg(long, requires = "recognized", conflicts_with_all = ["random", "check"])]
    expected: Option<String>,

    /// Text returned by the speech recognizer
    #[arg(long, requires = "expected")]
    recognized: Option<String>,

    /// Pick a random phrase from the catalog
    #[arg(long, conflicts_with = "check")]
    random: bool,

    /// Test text against the catalog
    #[arg(long)]
    check: Option<String>,
}

#[derive(Serialize)]
struct RandomReport<'a> {
    passphrase: &'a str,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    text: &'a str,
    accepted: bool,
    threshold: f64,
}

impl PassphraseCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;

        if self.random {
            let passphrase = cfg.catalog.random()?;
            return output(cli).write(&RandomReport { passphrase });
        }

        if let Some(text) = &self.check {
            let threshold = cfg.passphrase.threshold;
            return output(cli).write(&CheckReport {
                text,
                accepted: cfg.catalog.is_accepted(text, threshold),
                threshold,
            });
        }

        let (Some(expected), Some(recognized)) = (&self.expected, &self.recognized) else {
            anyhow::bail!("use --expected with --recognized, --random, or --check");
        };

        let mut verifier = PassphraseVerifier::new(cfg.passphrase);
        verifier.start(expected.as_str());
        let result = verifier.on_recognized(recognized)?;
        match &result.failure_reason {
            None => print_success(&format!(
                "Passphrase accepted ({:.2}%)",
                result.text_similarity * 100.0
            )),
            Some(reason) => print_error(reason),
        }
        output(cli).write(result)
    }
}
