//! Audio decoding, trimming and re-encoding of synthesized fragments.
//!
//! Each fragment returned by the provider is a complete audio file. Before it
//! is handed to the consumer it is decoded, the trailing silence is trimmed
//! and it is re-encoded without per-file metadata so consecutive fragments
//! play back cleanly. See [`FragmentPostProcessor`].

mod format;
mod mp3;
mod postprocess;
mod wav;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

pub use format::AudioFormat;
pub use mp3::{FrameHeader, FrameSpan, Mp3Clip, Mp3Codec, MpegLayer, MpegVersion};
pub use postprocess::{DEFAULT_TRIM_END, FragmentPostProcessor};
pub use wav::{PcmClip, PcmSamples, WavCodec};

/// Errors raised while handling encoded audio.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Failed to decode {format} audio: {reason}")]
    Decode { format: AudioFormat, reason: String },

    #[error("Failed to encode {format} audio: {reason}")]
    Encode { format: AudioFormat, reason: String },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// Decoded audio, ready to be trimmed and written back.
#[derive(Debug, Clone)]
pub enum AudioClip {
    Mp3(Mp3Clip),
    Pcm(PcmClip),
}

impl AudioClip {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Mp3(clip) => clip.duration(),
            Self::Pcm(clip) => clip.duration(),
        }
    }

    /// Remove up to `amount` of audio from the end of the clip.
    pub fn trim_end(&mut self, amount: Duration) {
        match self {
            Self::Mp3(clip) => clip.trim_end(amount),
            Self::Pcm(clip) => clip.trim_end(amount),
        }
    }
}

/// Decoder/encoder pair for one container format.
///
/// Implementations are synchronous and CPU-bound; async callers should run
/// them on the blocking pool.
pub trait AudioCodec: Send + Sync + Debug {
    fn format(&self) -> AudioFormat;

    fn decode(&self, data: Bytes) -> AudioResult<AudioClip>;

    fn encode(&self, clip: &AudioClip) -> AudioResult<Bytes>;
}

/// Codec able to post-process `format`.
pub fn codec_for(format: AudioFormat) -> AudioResult<Arc<dyn AudioCodec>> {
    match format {
        AudioFormat::Mp3 => Ok(Arc::new(Mp3Codec)),
        AudioFormat::Wav => Ok(Arc::new(WavCodec)),
        other => Err(AudioError::UnsupportedFormat(format!(
            "{other} fragments cannot be decoded for trimming"
        ))),
    }
}
