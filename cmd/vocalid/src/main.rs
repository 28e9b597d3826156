//! vocalid - voice enrollment and verification from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    CompareCommand, ConfigCommand, EnrollCommand, FeaturesCommand, PassphraseCommand, VadCommand,
    VerifyCommand,
};

/// vocalid - voice enrollment and verification.
///
/// Works on 16-bit mono WAV files. Files at other sample rates are
/// resampled to the analysis rate before processing.
///
/// Configuration is read from ~/.vocalid/config.yaml when present.
#[derive(Parser)]
#[command(name = "vocalid")]
#[command(about = "Voice biometric enrollment and verification")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.vocalid/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print acoustic features of one utterance
    Features(FeaturesCommand),
    /// Build a voice template from several utterances
    Enroll(EnrollCommand),
    /// Match an utterance against a stored template
    Verify(VerifyCommand),
    /// Compare the features of two utterances
    Compare(CompareCommand),
    /// Check or pick spoken passphrases
    Passphrase(PassphraseCommand),
    /// List speech segments in a recording
    Vad(VadCommand),
    /// Inspect configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Features(cmd) => cmd.run(&cli).await,
        Commands::Enroll(cmd) => cmd.run(&cli).await,
        Commands::Verify(cmd) => cmd.run(&cli).await,
        Commands::Compare(cmd) => cmd.run(&cli).await,
        Commands::Passphrase(cmd) => cmd.run(&cli).await,
        Commands::Vad(cmd) => cmd.run(&cli).await,
        Commands::Config(cmd) => cmd.run(&cli).await,
    }
}
