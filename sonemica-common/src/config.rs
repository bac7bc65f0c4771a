//! Bootstrap configuration and config file resolution
//!
//! Configuration is read once at startup from a single TOML file. Every field has a
//! built-in default, so a missing file (or a missing section) never prevents startup.
//!
//! # Config File Priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`SONEMICA_CONFIG`)
//! 3. Platform config directory (`~/.config/sonemica/config.toml` on Linux)
//! 4. Compiled defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SONEMICA_CONFIG";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name inside the platform config directory
const APP_DIR_NAME: &str = "sonemica";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Valence fusion weights
    pub fusion: FusionConfig,

    /// Track identity matching
    pub matching: MatchingConfig,

    /// Pipeline limits
    pub pipeline: PipelineConfig,

    /// Remote sentiment classifier
    pub classifier: ClassifierConfig,

    /// Reference dataset locations
    pub data: DataConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Weights applied when both audio and lyric valence are available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Weight of the audio-derived valence
    pub music_valence: f64,

    /// Weight of the lyric-derived valence
    pub lyrics_valence: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            music_valence: 0.6,
            lyrics_valence: 0.4,
        }
    }
}

/// Identity matching configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity ratio for a fuzzy key match (0.0-1.0)
    pub fuzzy_threshold: f64,

    /// Re-key sentiment records onto near-identical audio keys before fusion
    pub fuzzy_sentiment_join: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            fuzzy_sentiment_join: false,
        }
    }
}

/// Pipeline limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of recently played tracks analysed per request
    pub max_tracks: usize,

    /// Maximum number of classifier requests in flight
    pub classify_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_tracks: 50,
            classify_concurrency: 4,
        }
    }
}

/// Remote sentiment classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Classification endpoint (required by the `session` command)
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// Reference dataset locations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON array of audio feature rows
    pub audio_features_path: Option<PathBuf>,

    /// JSON array of lyric rows
    pub lyrics_path: Option<PathBuf>,
}

/// Config file resolver
///
/// Resolves which TOML file (if any) to load, following the priority order in the
/// module documentation.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    env_var_name: String,
}

impl ConfigResolver {
    /// Create resolver reading [`CONFIG_ENV_VAR`]
    pub fn new() -> Self {
        Self::with_env_var(CONFIG_ENV_VAR)
    }

    /// Create resolver reading a custom environment variable
    pub fn with_env_var(env_var_name: impl Into<String>) -> Self {
        Self {
            env_var_name: env_var_name.into(),
        }
    }

    /// Resolve config file path
    ///
    /// Returns `None` when no source names a file and the platform default does not exist.
    pub fn resolve_path(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        default_config_path().filter(|path| path.exists())
    }

    /// Resolve and load configuration
    ///
    /// A resolved file that does not exist produces a warning and compiled defaults.
    /// A file that exists but cannot be parsed is an error.
    pub fn load(&self, cli_arg: Option<&Path>) -> Result<TomlConfig> {
        let (config, source) = self.load_with_source(cli_arg)?;
        source.log();
        Ok(config)
    }

    /// Resolve and load configuration without logging
    ///
    /// For callers that configure logging from the loaded file: call
    /// [`ConfigSource::log`] once a subscriber is installed.
    pub fn load_with_source(&self, cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
        match self.resolve_path(cli_arg) {
            Some(path) if path.exists() => {
                let config = load_toml_config(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((TomlConfig::default(), ConfigSource::Missing(path))),
            None => Ok((TomlConfig::default(), ConfigSource::Defaults)),
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was named but does not exist; compiled defaults
    Missing(PathBuf),
    /// No file named or found; compiled defaults
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Configuration loaded from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigSource::Defaults => info!("No config file found, using built-in defaults"),
        }
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform config file location (may not exist)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Write a TOML config file atomically
///
/// Serializes to a sibling temp file, then renames it over `path`, so a reader never
/// observes a partially written file.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.fusion.music_valence, 0.6);
        assert_eq!(config.fusion.lyrics_valence, 0.4);
        assert_eq!(config.matching.fuzzy_threshold, 0.85);
        assert!(!config.matching.fuzzy_sentiment_join);
        assert_eq!(config.pipeline.max_tracks, 50);
        assert!(config.classifier.endpoint.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [fusion]
            music_valence = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.fusion.music_valence, 0.7);
        // Missing key within a present section keeps its default
        assert_eq!(config.fusion.lyrics_valence, 0.4);
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_cli_arg_has_priority() {
        let resolver = ConfigResolver::with_env_var("SONEMICA_TEST_UNSET_VAR");
        let path = resolver.resolve_path(Some(Path::new("/tmp/explicit.toml")));
        assert_eq!(path, Some(PathBuf::from("/tmp/explicit.toml")));
    }
}
