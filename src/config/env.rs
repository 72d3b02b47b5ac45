use std::env;
use std::str::FromStr;

use super::{ConfigError, ConfigResult};

/// Values read from environment variables.
///
/// The binary loads `.env` into the process environment at startup, so those
/// values show up here as well, below real environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub models_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub default_voice: Option<String>,
    pub audio_format: Option<String>,
    pub channel_capacity: Option<usize>,
    pub pacing_delay_ms: Option<u64>,
    pub trim_end_ms: Option<u64>,
    pub max_sentence_chars: Option<usize>,
    pub sentence_search_extension: Option<usize>,
    pub strip_chars: Option<String>,
}

impl EnvConfig {
    pub fn load() -> ConfigResult<Self> {
        Ok(Self {
            api_key: string("DEEPGRAM_API_KEY"),
            base_url: string("DEEPGRAM_BASE_URL"),
            models_url: string("DEEPGRAM_MODELS_URL"),
            request_timeout_secs: parsed("DEEPGRAM_REQUEST_TIMEOUT_SECS")?,
            default_voice: string("TTS_DEFAULT_VOICE"),
            audio_format: string("TTS_AUDIO_FORMAT"),
            channel_capacity: parsed("TTS_CHANNEL_CAPACITY")?,
            pacing_delay_ms: parsed("TTS_PACING_DELAY_MS")?,
            trim_end_ms: parsed("TTS_TRIM_END_MS")?,
            max_sentence_chars: parsed("TTS_MAX_SENTENCE_CHARS")?,
            sentence_search_extension: parsed("TTS_SENTENCE_SEARCH_EXTENSION")?,
            // an explicitly empty value disables stripping, so it is kept
            strip_chars: env::var("TTS_STRIP_CHARS").ok(),
        })
    }
}

/// Non-empty string value of `key`.
fn string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match string(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}
