pub mod audio;
pub mod pipeline;
pub mod text;
pub mod tts;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioFormat, AudioResult, FragmentPostProcessor};
pub use pipeline::{
    AudioFragment, AudioStream, PipelineConfig, PipelineError, PipelineResult, PipelineSummary,
    StreamOrchestrator,
};
pub use text::{Sentence, SentenceSegmenter, TextSanitizer};
pub use tts::{
    DeepgramConfig, DeepgramTTS, SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult,
    VoiceCatalog,
};
