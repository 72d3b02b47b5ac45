//! Configuration for the TTS stream service
//!
//! Configuration comes from `.env` files, YAML files and environment variables.
//! Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use waav_tts_stream::config::AppConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = AppConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallbacks
//! let config = AppConfig::from_file(Path::new("config.yaml"))?;
//! println!("Default voice: {}", config.default_voice);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::{DeepgramYaml, TtsYaml, YamlConfig};

use crate::core::pipeline::PipelineConfig;
use crate::core::tts::{DEFAULT_VOICE, DeepgramConfig};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
///
/// The Deepgram API key inside [`DeepgramConfig`] is zeroized when the
/// configuration is dropped.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub deepgram: DeepgramConfig,
    pub pipeline: PipelineConfig,
    /// Voice used when a request does not name one
    pub default_voice: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            deepgram: DeepgramConfig::default(),
            pipeline: PipelineConfig::default(),
            default_voice: DEFAULT_VOICE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `.env` is not read here; the binary loads it at startup.
    pub fn from_env() -> ConfigResult<Self> {
        let config = merge::merge_config(env::EnvConfig::load()?, None)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to environment
    /// variables and then defaults for anything the file leaves out.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(env::EnvConfig::load()?, Some(yaml_config))?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.deepgram.api_key.trim().is_empty()
    }
}
