//! Configuration for the Deepgram Aura REST API.

use std::time::Duration;

use super::{DEEPGRAM_MODELS_URL, DEEPGRAM_TTS_URL};
use crate::core::tts::base::{TTSError, TTSResult};

/// Timeout applied to synthesis requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to key verification and model listing.
pub const DEFAULT_CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for Deepgram.
#[derive(Clone)]
pub struct DeepgramConfig {
    /// API key sent as `Authorization: Token <key>`
    pub api_key: String,
    /// Speak endpoint
    pub base_url: String,
    /// Model listing endpoint
    pub models_url: String,
    pub request_timeout: Duration,
    pub control_timeout: Duration,
}

impl DeepgramConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api_key = api_key.into();
        config
    }

    pub fn validate(&self) -> TTSResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "Deepgram API key is required".to_string(),
            ));
        }
        for (name, url) in [("base_url", &self.base_url), ("models_url", &self.models_url)] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(TTSError::InvalidConfiguration(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(TTSError::InvalidConfiguration(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DeepgramConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEEPGRAM_TTS_URL.to_string(),
            models_url: DEEPGRAM_MODELS_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            control_timeout: DEFAULT_CONTROL_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for DeepgramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepgramConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models_url", &self.models_url)
            .field("request_timeout", &self.request_timeout)
            .field("control_timeout", &self.control_timeout)
            .finish()
    }
}

impl Drop for DeepgramConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.api_key.zeroize();
    }
}
