//! Background synthesis task.
//!
//! Consumes sentences one at a time, synthesizes and post-processes each, and
//! publishes the results into the bounded channel. A failing sentence is
//! logged and skipped; the run always ends with a single
//! [`PipelineMessage::Complete`] unless it was cancelled.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::{PipelineError, PipelineResult};
use super::message::{AudioFragment, PipelineMessage, PipelineSummary};
use crate::core::audio::FragmentPostProcessor;
use crate::core::text::Sentence;
use crate::core::tts::{SpeechSynthesizer, SynthesisRequest};
use crate::utils::truncate_for_log;

/// Characters of a failed sentence included in error logs.
const LOG_SENTENCE_CHARS: usize = 30;

pub struct SynthesisWorker {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    post_processor: FragmentPostProcessor,
    pacing_delay: Duration,
    cancel_token: CancellationToken,
}

impl SynthesisWorker {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        post_processor: FragmentPostProcessor,
        pacing_delay: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            synthesizer,
            post_processor,
            pacing_delay,
            cancel_token,
        }
    }

    /// Synthesize every sentence of `sentences` with `voice` into `sink`.
    ///
    /// Returns [`PipelineError::Cancelled`] when the token fires or the
    /// receiving side goes away before the run completes.
    pub async fn run<S>(
        self,
        sentences: S,
        voice: String,
        sink: mpsc::Sender<PipelineMessage>,
    ) -> PipelineResult<PipelineSummary>
    where
        S: Stream<Item = Sentence> + Send,
    {
        let mut sentences = std::pin::pin!(sentences);
        let mut summary = PipelineSummary::default();
        let format = self.post_processor.format();

        loop {
            let sentence = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => return Err(PipelineError::Cancelled),
                next = sentences.next() => match next {
                    Some(sentence) => sentence,
                    None => break,
                },
            };

            let sequence = summary.sentences;
            summary.sentences += 1;

            if !self.pacing_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel_token.cancelled() => return Err(PipelineError::Cancelled),
                    _ = tokio::time::sleep(self.pacing_delay) => {}
                }
            }

            debug!(
                sequence,
                chars = sentence.char_len(),
                provider = self.synthesizer.provider_name(),
                "Dispatching sentence for synthesis"
            );

            let request = SynthesisRequest::new(sentence.as_str(), voice.as_str(), format);
            let result = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => return Err(PipelineError::Cancelled),
                result = self.synthesizer.synthesize(&request) => result,
            };

            let raw = match result {
                Ok(raw) if raw.is_empty() => {
                    error!(
                        sequence,
                        sentence = truncate_for_log(sentence.as_str(), LOG_SENTENCE_CHARS),
                        "Synthesis returned no audio, skipping sentence"
                    );
                    summary.failures += 1;
                    continue;
                }
                Ok(raw) => raw,
                Err(source) => {
                    let err = PipelineError::Synthesis { sequence, source };
                    error!(
                        sequence,
                        sentence = truncate_for_log(sentence.as_str(), LOG_SENTENCE_CHARS),
                        error = %err,
                        "Error synthesizing sentence, skipping"
                    );
                    summary.failures += 1;
                    continue;
                }
            };

            let processor = self.post_processor.clone();
            let fallback = raw.clone();
            let data = match tokio::task::spawn_blocking(move || processor.process(raw)).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(sequence, error = %e, "Post-processing task failed, forwarding raw fragment");
                    fallback
                }
            };

            if data.is_empty() {
                error!(sequence, "Post-processing produced no audio, skipping sentence");
                summary.failures += 1;
                continue;
            }

            let message = PipelineMessage::Fragment(AudioFragment {
                sequence,
                data,
                format,
            });
            let sent = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => return Err(PipelineError::Cancelled),
                sent = sink.send(message) => sent,
            };
            if sent.is_err() {
                return Err(PipelineError::Cancelled);
            }
            summary.fragments += 1;
        }

        info!(
            sentences = summary.sentences,
            fragments = summary.fragments,
            failures = summary.failures,
            "Synthesis run complete"
        );

        if sink.send(PipelineMessage::Complete(summary)).await.is_err() {
            debug!("Consumer closed before completion was delivered");
        }
        Ok(summary)
    }
}
