//! Speech synthesis collaborators.
//!
//! The pipeline talks to providers only through [`SpeechSynthesizer`].
//! [`DeepgramTTS`] is the bundled implementation.

mod base;
pub mod deepgram;

pub use base::{SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult};
pub use deepgram::{
    DEEPGRAM_MODELS_URL, DEEPGRAM_TTS_URL, DEFAULT_VOICE, DeepgramConfig, DeepgramModelsClient,
    DeepgramTTS, VoiceCatalog, VoiceModel,
};
