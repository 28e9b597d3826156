//! Configuration file for the vocalid command line.
//!
//! The file lives at `~/.vocalid/config.yaml` unless a path is given.
//! Every section is optional; missing fields take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use vocalid_passphrase::{PassphraseCatalog, PassphraseConfig};
use vocalid_voiceprint::{CaptureConfig, EnrollConfig, MatchWeights};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".vocalid";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Effective configuration of all components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preprocessing, frame analysis and template constants.
    pub enroll: EnrollConfig,

    /// Voice activity detection and capture channel sizes.
    pub capture: CaptureConfig,

    /// Template match weights.
    pub weights: MatchWeights,

    /// Template score needed to accept a speaker (default: 0.8).
    pub speaker_threshold: f64,

    /// Passphrase similarity threshold.
    pub passphrase: PassphraseConfig,

    /// Phrases a user may be asked to speak.
    pub catalog: PassphraseCatalog,

    /// Path the configuration was loaded from (not serialized).
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enroll: EnrollConfig::default(),
            capture: CaptureConfig::default(),
            weights: MatchWeights::default(),
            speaker_threshold: 0.8,
            passphrase: PassphraseConfig::default(),
            catalog: PassphraseCatalog::default(),
            config_path: None,
        }
    }
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the file this configuration came from, if one existed.
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Parses a YAML document.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // An empty document is valid and means "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.speaker_threshold) {
            anyhow::bail!(
                "speaker_threshold must be within [0, 1], got {}",
                self.speaker_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.passphrase.threshold) {
            anyhow::bail!(
                "passphrase.threshold must be within [0, 1], got {}",
                self.passphrase.threshold
            );
        }
        if self.enroll.analysis.sample_rate == 0 {
            anyhow::bail!("enroll.analysis.sample_rate must be positive");
        }
        if self.capture.vad.sample_rate == 0 {
            anyhow::bail!("capture.vad.sample_rate must be positive");
        }
        if self.catalog.phrases().is_empty() {
            anyhow::bail!("catalog must contain at least one phrase");
        }
        Ok(())
    }
}

/// Loads configuration from `custom_path` or the default location.
///
/// A missing file yields the defaults; it is not created.
pub fn load_config(custom_path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    if !config_path.exists() {
        if custom_path.is_some() {
            anyhow::bail!("config file '{}' not found", config_path.display());
        }
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&config_path)?;
    let mut cfg = Config::from_yaml(&content)
        .map_err(|e| anyhow::anyhow!("invalid config '{}': {e}", config_path.display()))?;
    cfg.config_path = Some(config_path);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.speaker_threshold, 0.8);
        assert_eq!(cfg.passphrase.threshold, 0.7);
        assert_eq!(cfg.capture.vad.energy_threshold, 500.0);
        assert_eq!(cfg.catalog.phrases().len(), 5);
        assert!(cfg.path().is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml(
            "speaker_threshold: 0.65\ncapture:\n  vad:\n    silence_duration_ms: 1000\n",
        )
        .unwrap();
        assert_eq!(cfg.speaker_threshold, 0.65);
        assert_eq!(cfg.capture.vad.silence_duration_ms, 1000);
        assert_eq!(cfg.capture.vad.min_speech_duration_ms, 2000);
        assert_eq!(cfg.capture.channel_capacity, 32);
        assert_eq!(cfg.weights, MatchWeights::default());
    }

    #[test]
    fn test_catalog_from_yaml() {
        let cfg = Config::from_yaml("catalog:\n  - open sesame\n  - let me in\n").unwrap();
        assert_eq!(cfg.catalog.phrases(), ["open sesame", "let me in"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_yaml("speaker_threshold: 1.5\n").is_err());
        assert!(Config::from_yaml("passphrase:\n  threshold: -0.1\n").is_err());
        assert!(Config::from_yaml("catalog: []\n").is_err());
        assert!(Config::from_yaml("speaker_threshold: [oops]\n").is_err());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = Config::from_yaml("capture:\n  vad:\n    sample_rate: 0\n").unwrap_err();
        assert!(err.to_string().contains("capture.vad.sample_rate"));
        let err = Config::from_yaml("enroll:\n  analysis:\n    sample_rate: 0\n").unwrap_err();
        assert!(err.to_string().contains("enroll.analysis.sample_rate"));
        assert!(Config::from_yaml("capture:\n  vad:\n    sample_rate: 8000\n").is_ok());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "speaker_threshold: 0.9\n").unwrap();

        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.speaker_threshold, 0.9);
        assert_eq!(cfg.path(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(load_config(Some(&path)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_round_trip_yaml() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), cfg);
    }
}
