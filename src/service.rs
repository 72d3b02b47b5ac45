//! High-level speech service: voice selection, one-shot synthesis and
//! streaming, bundled with the configuration they share.

use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::core::audio::AudioFormat;
use crate::core::pipeline::{AudioStream, PipelineResult, StreamOrchestrator};
use crate::core::text::TextSanitizer;
use crate::core::tts::{
    DEFAULT_VOICE, DeepgramTTS, SpeechSynthesizer, SynthesisRequest, TTSResult, VoiceCatalog,
};

/// Per-request overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakOptions {
    pub voice: Option<String>,
    /// Language tag used to pick a voice when `voice` is not set
    pub language: Option<String>,
    /// Output format for one-shot synthesis
    pub format: Option<AudioFormat>,
}

impl SpeakOptions {
    pub fn with_voice(voice: impl Into<String>) -> Self {
        Self {
            voice: Some(voice.into()),
            ..Default::default()
        }
    }

    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Default::default()
        }
    }
}

pub struct TtsService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    orchestrator: StreamOrchestrator,
    catalog: Option<VoiceCatalog>,
    sanitizer: TextSanitizer,
    default_voice: String,
    default_format: AudioFormat,
}

impl TtsService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, config: &AppConfig) -> Self {
        Self {
            orchestrator: StreamOrchestrator::new(synthesizer.clone(), config.pipeline.clone()),
            synthesizer,
            catalog: None,
            sanitizer: TextSanitizer::new(config.pipeline.strip_chars.iter().copied()),
            default_voice: config.default_voice.clone(),
            default_format: config.pipeline.audio_format,
        }
    }

    /// Service backed by the Deepgram REST client.
    pub fn deepgram(config: &AppConfig) -> TTSResult<Self> {
        let tts = DeepgramTTS::new(config.deepgram.clone())?;
        Ok(Self::new(Arc::new(tts), config))
    }

    /// Attach a voice catalog used for language-based voice selection.
    pub fn with_catalog(mut self, catalog: VoiceCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn catalog(&self) -> Option<&VoiceCatalog> {
        self.catalog.as_ref()
    }

    /// Base languages offered by the catalog.
    pub fn supported_languages(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .map(VoiceCatalog::supported_languages)
            .unwrap_or_else(|| VoiceCatalog::default().supported_languages())
    }

    /// Pick the voice for a request.
    ///
    /// An explicit voice wins, then the catalog's voice for the requested
    /// language, then the configured default, then the built-in default.
    pub fn resolve_voice(&self, options: &SpeakOptions) -> String {
        if let Some(voice) = options.voice.as_deref().filter(|v| !v.trim().is_empty()) {
            return voice.to_string();
        }
        if let (Some(language), Some(catalog)) = (options.language.as_deref(), &self.catalog) {
            if let Some(voice) = catalog.voice_for_language(language) {
                return voice.to_string();
            }
            debug!(language, "No catalog voice for language, using default");
        }
        if self.default_voice.trim().is_empty() {
            DEFAULT_VOICE.to_string()
        } else {
            self.default_voice.clone()
        }
    }

    /// Synthesize `message` in a single request.
    pub async fn speak(
        &self,
        message: &str,
        options: &SpeakOptions,
    ) -> TTSResult<(AudioFormat, Bytes)> {
        let format = options.format.unwrap_or(self.default_format);
        let voice = self.resolve_voice(options);
        let text = self.sanitizer.sanitize(message);
        let request = SynthesisRequest::new(text.into_owned(), voice, format);

        match self.synthesizer.synthesize(&request).await {
            Ok(audio) => Ok((format, audio)),
            Err(e) => {
                error!(voice = %request.voice, error = %e, "Error in one-shot synthesis");
                Err(e)
            }
        }
    }

    /// Stream `text` through the sentence pipeline.
    pub fn stream<S, T>(&self, text: S, options: &SpeakOptions) -> PipelineResult<AudioStream>
    where
        S: Stream<Item = T> + Send + 'static,
        T: AsRef<str> + Send + 'static,
    {
        let voice = self.resolve_voice(options);
        debug!(voice = %voice, "Selected voice for streaming");
        self.orchestrator.process(text, voice)
    }
}
