use serde::Deserialize;
use std::path::Path;

use super::{ConfigError, ConfigResult};

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// deepgram:
///   api_key: "your-deepgram-key"
///   base_url: "https://api.deepgram.com/v1/speak"
///   models_url: "https://api.deepgram.com/v1/models"
///   request_timeout_secs: 30
///
/// tts:
///   default_voice: "aura-2-thalia-en"
///   audio_format: "mp3"
///   channel_capacity: 10
///   pacing_delay_ms: 100
///   trim_end_ms: 100
///   max_sentence_chars: 200
///   sentence_search_extension: 20
///   strip_chars: "*"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub deepgram: Option<DeepgramYaml>,
    pub tts: Option<TtsYaml>,
}

/// Deepgram connection settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DeepgramYaml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub models_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Pipeline settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub default_voice: Option<String>,
    pub audio_format: Option<String>,
    pub channel_capacity: Option<usize>,
    pub pacing_delay_ms: Option<u64>,
    pub trim_end_ms: Option<u64>,
    pub max_sentence_chars: Option<usize>,
    pub sentence_search_extension: Option<usize>,
    /// Every character of this string is stripped from incoming text
    pub strip_chars: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: YamlConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}
