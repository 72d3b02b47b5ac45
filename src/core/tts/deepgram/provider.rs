//! Deepgram Aura synthesis over the REST speak endpoint.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::{debug, info};

use super::config::DeepgramConfig;
use crate::core::audio::AudioFormat;
use crate::core::tts::base::{SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult};

/// Deepgram speak endpoint.
pub const DEEPGRAM_TTS_URL: &str = "https://api.deepgram.com/v1/speak";

/// Voice used when none is configured.
pub const DEFAULT_VOICE: &str = "aura-2-thalia-en";

/// Text sent when checking that an API key is accepted.
const VERIFY_TEXT: &str = "test";

/// Deepgram text-to-speech client.
///
/// Each call is a single `POST` returning a complete audio file for the
/// submitted text. The client is cheap to clone and share across tasks.
#[derive(Debug, Clone)]
pub struct DeepgramTTS {
    config: DeepgramConfig,
    client: reqwest::Client,
}

impl DeepgramTTS {
    pub fn new(config: DeepgramConfig) -> TTSResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                TTSError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &DeepgramConfig {
        &self.config
    }

    /// Check the API key with a minimal synthesis request.
    pub async fn verify_api_key(&self) -> TTSResult<()> {
        let request = SynthesisRequest::new(VERIFY_TEXT, DEFAULT_VOICE, AudioFormat::Mp3);
        self.speak(&request, self.config.control_timeout).await?;
        info!("Deepgram API key verified");
        Ok(())
    }

    async fn speak(&self, request: &SynthesisRequest, timeout: Duration) -> TTSResult<Bytes> {
        let mut query = vec![
            ("model", request.voice.as_str()),
            ("encoding", request.format.encoding()),
        ];
        if let Some(container) = request.format.container() {
            query.push(("container", container));
        }

        debug!(
            text_len = request.text.len(),
            voice = %request.voice,
            format = %request.format,
            "Deepgram TTS synthesis request"
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .query(&query)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("Content-Type", "text/plain")
            .timeout(timeout)
            .body(request.text.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_status(status, message));
        }

        let audio = response.bytes().await?;
        debug!(audio_bytes = audio.len(), "Deepgram TTS synthesis complete");
        Ok(audio)
    }
}

fn classify_status(status: StatusCode, message: String) -> TTSError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TTSError::AuthenticationFailed(
            format!("Deepgram rejected the API key (HTTP {}): {message}", status.as_u16()),
        ),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TTSError::Timeout(format!("HTTP {}: {message}", status.as_u16()))
        }
        _ => TTSError::ProviderError {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl SpeechSynthesizer for DeepgramTTS {
    fn provider_name(&self) -> &'static str {
        "deepgram"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
        self.speak(request, self.config.request_timeout).await
    }
}
