//! Sentence-by-sentence streaming text-to-speech.
//!
//! Text arriving in arbitrary chunks (for example tokens from a language
//! model) is split into complete sentences, each sentence is synthesized on
//! its own and the resulting audio is trimmed and re-encoded into
//! independently playable fragments. See [`core::pipeline`] for the pipeline
//! and [`TtsService`] for the high-level entry point.

pub mod config;
pub mod core;
pub mod service;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::{AppConfig, ConfigError, ConfigResult};
pub use core::*;
pub use service::{SpeakOptions, TtsService};
