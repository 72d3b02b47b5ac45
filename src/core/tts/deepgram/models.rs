//! Deepgram model listing and the read-only voice catalog built from it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::DeepgramConfig;
use crate::core::tts::base::{TTSError, TTSResult};

/// Deepgram model listing endpoint.
pub const DEEPGRAM_MODELS_URL: &str = "https://api.deepgram.com/v1/models";

/// Language reported when the catalog lists none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// One text-to-speech model as listed by Deepgram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceModel {
    /// Short display name, e.g. `thalia`
    pub name: String,
    /// Model identifier passed as `model=`, e.g. `aura-2-thalia-en`
    pub canonical_name: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    tts: Vec<VoiceModel>,
}

/// Fetches the model listing.
#[derive(Debug, Clone)]
pub struct DeepgramModelsClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl DeepgramModelsClient {
    pub fn new(config: &DeepgramConfig) -> TTSResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.control_timeout)
            .build()
            .map_err(|e| {
                TTSError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            url: config.models_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// List the available text-to-speech models.
    pub async fn fetch_models(&self) -> TTSResult<Vec<VoiceModel>> {
        let mut request = self.client.get(&self.url);
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Token {}", self.api_key));
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TTSError::ProviderError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ModelsResponse = response.json().await.map_err(|e| TTSError::ProviderError {
            status: status.as_u16(),
            message: format!("Failed to parse model listing: {e}"),
        })?;
        debug!(models = body.tts.len(), "Fetched Deepgram TTS models");
        Ok(body.tts)
    }

    /// Fetch the listing and build a catalog from it.
    pub async fn fetch_catalog(&self) -> TTSResult<VoiceCatalog> {
        self.fetch_models().await.map(VoiceCatalog::new)
    }
}

impl Drop for DeepgramModelsClient {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.api_key.zeroize();
    }
}

/// Base language of a tag: `en-US` and `en_US` both map to `en`.
fn base_language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Read-only lookup of voices by language.
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    models: Vec<VoiceModel>,
}

impl VoiceCatalog {
    pub fn new(models: Vec<VoiceModel>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[VoiceModel] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Sorted unique base languages, or [`DEFAULT_LANGUAGE`] when none are listed.
    pub fn supported_languages(&self) -> Vec<String> {
        let languages: BTreeSet<&str> = self
            .models
            .iter()
            .flat_map(|m| m.languages.iter())
            .map(|lang| base_language(lang))
            .collect();
        if languages.is_empty() {
            vec![DEFAULT_LANGUAGE.to_string()]
        } else {
            languages.into_iter().map(str::to_string).collect()
        }
    }

    /// `(canonical_name, name)` pairs for voices speaking `language`'s base
    /// language, or `None` when there are none.
    pub fn voices_for_language(&self, language: &str) -> Option<Vec<(String, String)>> {
        let base = base_language(language);
        let voices: Vec<_> = self
            .models
            .iter()
            .filter(|m| m.languages.iter().any(|l| base_language(l) == base))
            .map(|m| (m.canonical_name.clone(), m.name.clone()))
            .collect();
        (!voices.is_empty()).then_some(voices)
    }

    /// First voice listing exactly `language`.
    pub fn voice_for_language(&self, language: &str) -> Option<&str> {
        self.models
            .iter()
            .find(|m| m.languages.iter().any(|l| l == language))
            .map(|m| m.canonical_name.as_str())
    }

    pub fn contains(&self, voice: &str) -> bool {
        self.models.iter().any(|m| m.canonical_name == voice)
    }
}
