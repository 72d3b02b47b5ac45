//! Deepgram Aura text-to-speech.
//!
//! # Example
//!
//! ```rust,ignore
//! use waav_tts_stream::core::audio::AudioFormat;
//! use waav_tts_stream::core::tts::{DeepgramConfig, DeepgramTTS, SpeechSynthesizer, SynthesisRequest};
//!
//! let tts = DeepgramTTS::new(DeepgramConfig::new("dg-key"))?;
//! let request = SynthesisRequest::new("Hello there.", "aura-2-thalia-en", AudioFormat::Mp3);
//! let mp3 = tts.synthesize(&request).await?;
//! ```

mod config;
mod models;
mod provider;

pub use config::{DEFAULT_CONTROL_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DeepgramConfig};
pub use models::{
    DEEPGRAM_MODELS_URL, DEFAULT_LANGUAGE, DeepgramModelsClient, VoiceCatalog, VoiceModel,
};
pub use provider::{DEEPGRAM_TTS_URL, DEFAULT_VOICE, DeepgramTTS};
