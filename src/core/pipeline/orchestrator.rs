//! Wires sanitizer, segmenter and synthesis worker together and exposes the
//! result as a [`Stream`] of [`AudioFragment`]s.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::error::{PipelineError, PipelineResult};
use super::message::{AudioFragment, PipelineMessage, PipelineSummary};
use super::worker::SynthesisWorker;
use crate::core::audio::{AudioFormat, AudioResult, DEFAULT_TRIM_END, FragmentPostProcessor};
use crate::core::text::{DEFAULT_STRIP_CHARS, SegmenterConfig, TextSanitizer, sentence_stream};
use crate::core::tts::SpeechSynthesizer;

/// Fragments buffered between the worker and the consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;

/// Delay before each synthesis request.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(100);

/// Settings for one [`StreamOrchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub channel_capacity: usize,
    pub pacing_delay: Duration,
    pub trim_end: Duration,
    pub audio_format: AudioFormat,
    pub segmenter: SegmenterConfig,
    /// Characters removed from every incoming chunk
    pub strip_chars: Vec<char>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            pacing_delay: DEFAULT_PACING_DELAY,
            trim_end: DEFAULT_TRIM_END,
            audio_format: AudioFormat::default(),
            segmenter: SegmenterConfig::default(),
            strip_chars: DEFAULT_STRIP_CHARS.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Check the settings and the post-processing capability for
    /// `audio_format`.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.channel_capacity == 0 {
            return Err(PipelineError::Configuration(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.segmenter.max_chars == 0 {
            return Err(PipelineError::Configuration(
                "max_sentence_chars must be at least 1".to_string(),
            ));
        }
        FragmentPostProcessor::for_format(self.audio_format, self.trim_end)?;
        Ok(())
    }
}

/// Runs the text → audio pipeline.
///
/// Each call to [`process`](Self::process) starts an independent run with its
/// own segmenter, channel and background task.
#[derive(Clone)]
pub struct StreamOrchestrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: PipelineConfig,
}

impl StreamOrchestrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, config: PipelineConfig) -> Self {
        Self {
            synthesizer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start synthesizing `text` with `voice`.
    ///
    /// Fails with [`PipelineError::Configuration`] before any work starts when
    /// the configured format cannot be post-processed. Otherwise the worker is
    /// spawned immediately and fragments are yielded in sentence order.
    /// Must be called from within a tokio runtime.
    pub fn process<S, T>(&self, text: S, voice: impl Into<String>) -> PipelineResult<AudioStream>
    where
        S: Stream<Item = T> + Send + 'static,
        T: AsRef<str> + Send + 'static,
    {
        self.config.validate()?;
        let voice = voice.into();
        if voice.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "voice must not be empty".to_string(),
            ));
        }

        let post_processor =
            FragmentPostProcessor::for_format(self.config.audio_format, self.config.trim_end)?;
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let cancel_token = CancellationToken::new();

        let sentences = sentence_stream(
            text,
            TextSanitizer::new(self.config.strip_chars.iter().copied()),
            self.config.segmenter,
        );
        let worker = SynthesisWorker::new(
            self.synthesizer.clone(),
            post_processor.clone(),
            self.config.pacing_delay,
            cancel_token.clone(),
        );

        debug!(
            voice = %voice,
            format = %self.config.audio_format,
            channel_capacity = self.config.channel_capacity,
            "Starting TTS stream"
        );

        let handle = tokio::spawn(async move {
            if let Err(e) = worker.run(sentences, voice, tx).await {
                debug!(error = %e, "Synthesis worker stopped early");
            }
        });

        Ok(AudioStream {
            receiver: rx,
            post_processor,
            pending: None,
            summary: None,
            finished: false,
            cancel_token,
            worker: handle,
        })
    }
}

struct PendingFragment {
    sequence: u64,
    format: AudioFormat,
    task: JoinHandle<AudioResult<Bytes>>,
}

/// Fragments of one pipeline run.
///
/// Each fragment received from the worker is decoded and re-encoded on the
/// blocking pool before it is yielded; fragments that fail this pass are
/// logged and skipped. Dropping the stream (or calling
/// [`cancel`](Self::cancel)) stops the background worker.
pub struct AudioStream {
    receiver: mpsc::Receiver<PipelineMessage>,
    post_processor: FragmentPostProcessor,
    pending: Option<PendingFragment>,
    summary: Option<PipelineSummary>,
    finished: bool,
    cancel_token: CancellationToken,
    worker: JoinHandle<()>,
}

impl AudioStream {
    /// Run summary, available once the stream has ended normally.
    pub fn summary(&self) -> Option<PipelineSummary> {
        self.summary
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop the run without waiting for queued fragments.
    pub fn cancel(&mut self) {
        if !self.finished {
            debug!("Cancelling TTS stream");
        }
        self.finished = true;
        self.pending = None;
        self.cancel_token.cancel();
        self.worker.abort();
        self.receiver.close();
    }
}

impl Stream for AudioStream {
    type Item = AudioFragment;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(pending) = this.pending.as_mut() {
                let joined = ready!(Pin::new(&mut pending.task).poll(cx));
                let (sequence, format) = (pending.sequence, pending.format);
                this.pending = None;

                match joined {
                    Ok(Ok(data)) => {
                        return Poll::Ready(Some(AudioFragment {
                            sequence,
                            data,
                            format,
                        }));
                    }
                    Ok(Err(source)) => {
                        let err = PipelineError::PostProcess { sequence, source };
                        error!(sequence, error = %err, "Dropping fragment that failed re-encoding");
                    }
                    Err(e) => {
                        error!(sequence, error = %e, "Re-encoding task failed, dropping fragment");
                    }
                }
                continue;
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match ready!(this.receiver.poll_recv(cx)) {
                Some(PipelineMessage::Fragment(fragment)) => {
                    let processor = this.post_processor.clone();
                    let data = fragment.data;
                    this.pending = Some(PendingFragment {
                        sequence: fragment.sequence,
                        format: fragment.format,
                        task: tokio::task::spawn_blocking(move || processor.reencode(data)),
                    });
                }
                Some(PipelineMessage::Complete(summary)) => {
                    this.summary = Some(summary);
                    this.finished = true;
                    return Poll::Ready(None);
                }
                None => {
                    warn!("Audio channel closed without a completion signal");
                    this.finished = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        self.worker.abort();
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("format", &self.post_processor.format())
            .field("finished", &self.finished)
            .field("summary", &self.summary)
            .finish()
    }
}
