use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::audio::AudioFormat;

/// Errors raised by a synthesis collaborator.
#[derive(Debug, Error)]
pub enum TTSError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Provider error (HTTP {status}): {message}")]
    ProviderError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl TTSError {
    /// The provider rejected the credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// The provider could not be reached or did not answer in time.
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for TTSError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

pub type TTSResult<T> = Result<T, TTSError>;

/// One synthesis call: text, voice and the encoding to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    #[serde(default)]
    pub format: AudioFormat,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, format: AudioFormat) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            format,
        }
    }
}

/// A text-to-speech backend returning one encoded audio file per request.
///
/// The pipeline only depends on this trait; an empty response is a valid
/// return value and is treated by callers as "nothing to play".
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short provider name for logs.
    fn provider_name(&self) -> &'static str;

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes>;
}
