//! Configuration commands.

use clap::{Args, Subcommand};

use vocalid_cli::Config;

use super::{get_config, output};
use crate::Cli;

/// Inspect configuration.
///
/// Configuration is read from ~/.vocalid/config.yaml, or the file given
/// with --config. Missing settings take their defaults.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::Show => {
                let cfg = get_config(cli)?;
                output(cli).write(&cfg)
            }
            ConfigSubcommand::Path => {
                let cfg = get_config(cli)?;
                let path = match cfg.path() {
                    Some(p) => p.to_path_buf(),
                    None => Config::default_config_path()
                        .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
                };
                println!("{}", path.display());
                if cfg.path().is_none() {
                    eprintln!("(file does not exist; defaults in use)");
                }
                Ok(())
            }
        }
    }
}
