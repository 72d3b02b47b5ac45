//! Scripted `SpeechSynthesizer` implementations.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use waav_tts_stream::core::audio::AudioFormat;
use waav_tts_stream::core::tts::{SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult};

use super::audio_fixtures::{provider_mp3, wav_tone};

/// Returns a provider-shaped file for every request, optionally failing on
/// chosen calls (1-based).
#[derive(Default)]
pub struct StubSynthesizer {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<SynthesisRequest>>,
    pub fail_on: Vec<usize>,
    pub empty_on: Vec<usize>,
}

impl StubSynthesizer {
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.to_vec(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    fn provider_name(&self) -> &'static str {
        "stub"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        if self.fail_on.contains(&call) {
            return Err(TTSError::ProviderError {
                status: 500,
                message: "scripted failure".to_string(),
            });
        }
        if self.empty_on.contains(&call) {
            return Ok(Bytes::new());
        }

        Ok(match request.format {
            AudioFormat::Wav => Bytes::from(wav_tone(std::time::Duration::from_millis(500))),
            _ => Bytes::from(provider_mp3(10)),
        })
    }
}

/// Answers the first request, then never returns. Sets `dropped` when the
/// in-flight call is dropped, which happens when the worker task is aborted.
#[derive(Default)]
pub struct HangingSynthesizer {
    pub calls: AtomicUsize,
    pub dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechSynthesizer for HangingSynthesizer {
    fn provider_name(&self) -> &'static str {
        "hanging"
    }

    async fn synthesize(&self, _request: &SynthesisRequest) -> TTSResult<Bytes> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(Bytes::from(provider_mp3(10)));
        }
        let _flag = DropFlag(self.dropped.clone());
        std::future::pending().await
    }
}
