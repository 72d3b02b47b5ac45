//! Pipeline error types

use thiserror::Error;

use crate::core::audio::AudioError;
use crate::core::tts::TTSError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised by the streaming pipeline.
///
/// Only [`PipelineError::Configuration`] reaches the caller of
/// [`StreamOrchestrator::process`](super::StreamOrchestrator::process).
/// Synthesis and post-processing failures are logged and the affected
/// sentence is skipped.
#[derive(Error, Debug)]
pub enum PipelineError {
    // ─────────────────────────────────────────────────────────────────────────────
    // Fatal
    // ─────────────────────────────────────────────────────────────────────────────
    /// The pipeline cannot run with the requested settings
    #[error("Pipeline configuration error: {0}")]
    Configuration(String),

    // ─────────────────────────────────────────────────────────────────────────────
    // Recovered per sentence
    // ─────────────────────────────────────────────────────────────────────────────
    /// Segmenter failed to make progress on its buffer
    #[error("Sentence extraction failed: {0}")]
    SentenceExtraction(String),

    #[error("Synthesis failed for sentence {sequence}: {source}")]
    Synthesis {
        sequence: u64,
        #[source]
        source: TTSError,
    },

    #[error("Post-processing failed for fragment {sequence}: {source}")]
    PostProcess {
        sequence: u64,
        #[source]
        source: AudioError,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Teardown
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("Pipeline cancelled")]
    Cancelled,
}

impl From<AudioError> for PipelineError {
    fn from(err: AudioError) -> Self {
        Self::Configuration(err.to_string())
    }
}
