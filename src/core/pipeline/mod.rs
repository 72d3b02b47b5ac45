//! Streaming text-to-speech pipeline.
//!
//! ```text
//! text chunks ─▶ sanitize ─▶ segment ─▶ SynthesisWorker ─▶ mpsc ─▶ AudioStream ─▶ caller
//!                                      (synthesize,      (bounded)  (re-encode)
//!                                       trim, encode)
//! ```
//!
//! One sentence is in flight at a time and the bounded channel is the only
//! throttle: when the consumer stops pulling, the worker blocks on `send`
//! after `channel_capacity` fragments.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use waav_tts_stream::core::pipeline::{PipelineConfig, StreamOrchestrator};
//!
//! let orchestrator = StreamOrchestrator::new(synthesizer, PipelineConfig::default());
//! let mut audio = orchestrator.process(futures::stream::iter(["Hello. ", "World."]), "aura-2-thalia-en")?;
//! while let Some(fragment) = audio.next().await {
//!     player.play(fragment.data).await;
//! }
//! ```

mod error;
mod message;
mod orchestrator;
mod worker;

pub use error::{PipelineError, PipelineResult};
pub use message::{AudioFragment, PipelineMessage, PipelineSummary};
pub use orchestrator::{
    AudioStream, DEFAULT_CHANNEL_CAPACITY, DEFAULT_PACING_DELAY, PipelineConfig,
    StreamOrchestrator,
};
pub use worker::SynthesisWorker;
