//! Per-fragment post-processing: decode, trim the tail, re-encode.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use super::{AudioCodec, AudioFormat, AudioResult, codec_for};

/// Trailing audio removed from every fragment.
///
/// Provider responses end with a short silence; removing it keeps the pause
/// between sentences natural when fragments are played back to back.
pub const DEFAULT_TRIM_END: Duration = Duration::from_millis(100);

/// Trims and re-encodes synthesized fragments.
///
/// Processing never fails from the caller's point of view: when the bytes
/// cannot be decoded or written back, the raw provider bytes are returned
/// unchanged and a warning is logged.
#[derive(Debug, Clone)]
pub struct FragmentPostProcessor {
    codec: Arc<dyn AudioCodec>,
    trim_end: Duration,
}

impl FragmentPostProcessor {
    pub fn new(codec: Arc<dyn AudioCodec>, trim_end: Duration) -> Self {
        Self { codec, trim_end }
    }

    /// Processor for `format`, failing when the format cannot be decoded.
    pub fn for_format(format: AudioFormat, trim_end: Duration) -> AudioResult<Self> {
        Ok(Self::new(codec_for(format)?, trim_end))
    }

    pub fn format(&self) -> AudioFormat {
        self.codec.format()
    }

    pub fn trim_end(&self) -> Duration {
        self.trim_end
    }

    /// Decode, trim and re-encode `raw`, falling back to `raw` on error.
    pub fn process(&self, raw: Bytes) -> Bytes {
        match self.try_process(raw.clone()) {
            Ok(processed) => processed,
            Err(e) => {
                warn!(
                    format = %self.format(),
                    bytes = raw.len(),
                    error = %e,
                    "Audio post-processing failed, forwarding raw fragment"
                );
                raw
            }
        }
    }

    /// Decode, trim and re-encode `raw`.
    ///
    /// Clips no longer than the trim duration are re-encoded untrimmed.
    pub fn try_process(&self, raw: Bytes) -> AudioResult<Bytes> {
        let input_len = raw.len();
        let mut clip = self.codec.decode(raw)?;
        let before = clip.duration();
        if before > self.trim_end {
            clip.trim_end(self.trim_end);
        }
        let encoded = self.codec.encode(&clip)?;

        debug!(
            format = %self.format(),
            input_bytes = input_len,
            output_bytes = encoded.len(),
            duration_ms = before.as_millis() as u64,
            trimmed_ms = (before - clip.duration()).as_millis() as u64,
            "Post-processed audio fragment"
        );
        Ok(encoded)
    }

    /// Decode `data` and write it back untrimmed.
    ///
    /// Read-side validation pass applied to every fragment before it is
    /// yielded by [`AudioStream`](crate::core::pipeline::AudioStream).
    pub fn reencode(&self, data: Bytes) -> AudioResult<Bytes> {
        let clip = self.codec.decode(data)?;
        self.codec.encode(&clip)
    }
}

impl Default for FragmentPostProcessor {
    fn default() -> Self {
        Self::new(Arc::new(super::Mp3Codec), DEFAULT_TRIM_END)
    }
}
