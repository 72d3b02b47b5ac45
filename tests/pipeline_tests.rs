//! End-to-end pipeline tests with scripted synthesizers.

mod fixtures;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::time::{sleep, timeout};

use fixtures::*;
use waav_tts_stream::core::audio::{AudioFormat, Mp3Codec};
use waav_tts_stream::core::pipeline::{
    AudioFragment, PipelineConfig, PipelineSummary, StreamOrchestrator,
};

const VOICE: &str = "aura-2-thalia-en";

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        pacing_delay: Duration::ZERO,
        ..Default::default()
    }
}

async fn collect(stream: waav_tts_stream::AudioStream) -> (Vec<AudioFragment>, Option<PipelineSummary>) {
    let mut stream = stream;
    let mut fragments = Vec::new();
    while let Some(fragment) = timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("pipeline stalled")
    {
        fragments.push(fragment);
    }
    (fragments, stream.summary())
}

#[tokio::test]
async fn test_two_sentences_yield_two_standalone_fragments() {
    let synth = Arc::new(StubSynthesizer::default());
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let stream = orchestrator
        .process(
            futures::stream::iter(["Hello world. ", "This is a test."]),
            VOICE,
        )
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert_eq!(synth.texts(), vec!["Hello world.", "This is a test."]);
    assert_eq!(fragments.len(), 2);
    assert_eq!(
        fragments.iter().map(|f| f.sequence).collect::<Vec<_>>(),
        vec![0, 1]
    );

    for fragment in &fragments {
        assert_eq!(fragment.format, AudioFormat::Mp3);
        // tags and the Info frame are gone, 4 x 24 ms frames trimmed
        assert_eq!(fragment.data.len(), 6 * MP3_24K_FRAME_LEN);
        assert_eq!(&fragment.data[..4], &MP3_HEADER_24K_MONO);
        let clip = Mp3Codec.decode_clip(fragment.data.clone()).unwrap();
        assert_eq!(clip.frames().len(), 6);
    }

    assert_eq!(
        summary,
        Some(PipelineSummary {
            sentences: 2,
            fragments: 2,
            failures: 0
        })
    );
}

#[tokio::test]
async fn test_failed_sentence_is_skipped() {
    let synth = Arc::new(StubSynthesizer::failing_on(&[2]));
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let stream = orchestrator
        .process(
            futures::stream::iter(["First one. Second one. ", "Third one."]),
            VOICE,
        )
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert_eq!(synth.call_count(), 3);
    assert_eq!(
        fragments.iter().map(|f| f.sequence).collect::<Vec<_>>(),
        vec![0, 2]
    );
    let summary = summary.unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.fragments, 2);
}

#[tokio::test]
async fn test_empty_synthesis_result_is_skipped() {
    let synth = Arc::new(StubSynthesizer {
        empty_on: vec![1],
        ..Default::default()
    });
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let stream = orchestrator
        .process(futures::stream::iter(["One. Two."]), VOICE)
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].sequence, 1);
    assert_eq!(summary.unwrap().failures, 1);
}

#[tokio::test]
async fn test_all_failures_yield_empty_stream() {
    let synth = Arc::new(StubSynthesizer::failing_on(&[1, 2]));
    let orchestrator = StreamOrchestrator::new(synth, fast_config());

    let stream = orchestrator
        .process(futures::stream::iter(["One. Two."]), VOICE)
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert!(fragments.is_empty());
    assert_eq!(
        summary,
        Some(PipelineSummary {
            sentences: 2,
            fragments: 0,
            failures: 2
        })
    );
}

#[tokio::test]
async fn test_wav_fragments_are_trimmed() {
    let synth = Arc::new(StubSynthesizer::default());
    let config = PipelineConfig {
        audio_format: AudioFormat::Wav,
        ..fast_config()
    };
    let orchestrator = StreamOrchestrator::new(synth.clone(), config);

    let stream = orchestrator
        .process(futures::stream::iter(["Only sentence."]), VOICE)
        .unwrap();
    let (fragments, _) = collect(stream).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].format, AudioFormat::Wav);
    // 500 ms at 24 kHz minus 100 ms
    assert_eq!(wav_frame_count(&fragments[0].data), 9_600);
    assert_eq!(
        synth.requests.lock().unwrap()[0].format,
        AudioFormat::Wav
    );
}

#[tokio::test]
async fn test_text_is_sanitized_and_decimals_survive_chunking() {
    let synth = Arc::new(StubSynthesizer::default());
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let stream = orchestrator
        .process(
            futures::stream::iter(["**Pi** is 3.", "14 today."]),
            VOICE,
        )
        .unwrap();
    let (fragments, _) = collect(stream).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(synth.texts(), vec!["Pi is 3.14 today."]);
}

#[tokio::test]
async fn test_empty_input_ends_immediately() {
    let synth = Arc::new(StubSynthesizer::default());
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let stream = orchestrator
        .process(futures::stream::iter(["...", " !!"]), VOICE)
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert!(fragments.is_empty());
    assert_eq!(synth.call_count(), 0);
    assert_eq!(summary, Some(PipelineSummary::default()));
}

#[tokio::test]
async fn test_full_channel_stalls_dispatch() {
    let synth = Arc::new(StubSynthesizer::default());
    let config = PipelineConfig {
        channel_capacity: 2,
        ..fast_config()
    };
    let orchestrator = StreamOrchestrator::new(synth.clone(), config);

    let text: Vec<String> = (0..20).map(|i| format!("Sentence number {i} is here. ")).collect();
    let mut stream = orchestrator
        .process(futures::stream::iter(text), VOICE)
        .unwrap();

    // two fragments queued, a third synthesized and blocked on send
    sleep(Duration::from_millis(300)).await;
    assert_eq!(synth.call_count(), 3);

    let first = timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.sequence, 0);

    sleep(Duration::from_millis(300)).await;
    assert_eq!(synth.call_count(), 4);
}

#[tokio::test]
async fn test_dropping_stream_stops_worker() {
    let synth = Arc::new(HangingSynthesizer::default());
    let dropped = synth.dropped.clone();
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let mut stream = orchestrator
        .process(futures::stream::iter(["One. Two. Three."]), VOICE)
        .unwrap();

    let first = timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.sequence, 0);

    // wait until the second request is in flight
    timeout(Duration::from_secs(5), async {
        while synth.calls.load(Ordering::SeqCst) < 2 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    drop(stream);

    timeout(Duration::from_secs(5), async {
        while !dropped.load(Ordering::SeqCst) {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("worker was not torn down");
    assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cancel_ends_stream() {
    let synth = Arc::new(HangingSynthesizer::default());
    let orchestrator = StreamOrchestrator::new(synth, fast_config());

    let mut stream = orchestrator
        .process(futures::stream::iter(["One. Two."]), VOICE)
        .unwrap();
    let _ = timeout(Duration::from_secs(5), stream.next()).await.unwrap();

    stream.cancel();
    assert!(stream.next().await.is_none());
    assert!(stream.summary().is_none());
}

#[tokio::test]
async fn test_undecodable_audio_is_forwarded_raw() {
    use async_trait::async_trait;
    use waav_tts_stream::core::tts::{SpeechSynthesizer, SynthesisRequest, TTSResult};

    struct GarbageSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for GarbageSynthesizer {
        fn provider_name(&self) -> &'static str {
            "garbage"
        }

        async fn synthesize(&self, _request: &SynthesisRequest) -> TTSResult<Bytes> {
            Ok(Bytes::from_static(b"not an mp3"))
        }
    }

    // the worker forwards the raw bytes, the read side cannot re-encode them
    let orchestrator = StreamOrchestrator::new(Arc::new(GarbageSynthesizer), fast_config());
    let stream = orchestrator
        .process(futures::stream::iter(["Hello."]), VOICE)
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert!(fragments.is_empty());
    assert_eq!(summary.unwrap().fragments, 1);
}

#[tokio::test]
async fn test_words_stay_apart_across_chunk_boundaries() {
    let synth = Arc::new(StubSynthesizer::default());
    let orchestrator = StreamOrchestrator::new(synth.clone(), fast_config());

    let stream = orchestrator
        .process(
            futures::stream::iter(["Hello there. This line\n", "continues here.\n"]),
            VOICE,
        )
        .unwrap();
    let (fragments, _) = collect(stream).await;

    assert_eq!(fragments.len(), 2);
    assert_eq!(
        synth.texts(),
        vec!["Hello there.", "This line\ncontinues here."]
    );
}

#[tokio::test]
async fn test_short_fragment_is_reencoded_untrimmed() {
    use async_trait::async_trait;
    use waav_tts_stream::core::tts::{SpeechSynthesizer, SynthesisRequest, TTSResult};

    /// Answers with 3 x 24 ms of audio, shorter than the trim.
    struct ShortSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for ShortSynthesizer {
        fn provider_name(&self) -> &'static str {
            "short"
        }

        async fn synthesize(&self, _request: &SynthesisRequest) -> TTSResult<Bytes> {
            Ok(Bytes::from(provider_mp3(3)))
        }
    }

    let orchestrator = StreamOrchestrator::new(Arc::new(ShortSynthesizer), fast_config());
    let stream = orchestrator
        .process(futures::stream::iter(["Yes."]), VOICE)
        .unwrap();
    let (fragments, summary) = collect(stream).await;

    assert_eq!(fragments.len(), 1);
    // tags and the Info frame are gone, every audio frame is kept
    assert_eq!(fragments[0].data.len(), 3 * MP3_24K_FRAME_LEN);
    assert_eq!(&fragments[0].data[..4], &MP3_HEADER_24K_MONO);
    assert_eq!(summary.unwrap().failures, 0);
}
