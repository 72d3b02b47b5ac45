use bytes::Bytes;
use serde::Serialize;

use crate::core::audio::AudioFormat;

/// Encoded audio for exactly one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFragment {
    /// Zero-based index of the sentence this fragment was synthesized from
    pub sequence: u64,
    pub data: Bytes,
    pub format: AudioFormat,
}

impl AudioFragment {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// Sentences handed to the worker
    pub sentences: u64,
    /// Fragments published to the channel
    pub fragments: u64,
    /// Sentences skipped because synthesis failed or returned nothing
    pub failures: u64,
}

/// Item carried by the worker → consumer channel.
#[derive(Debug, Clone)]
pub enum PipelineMessage {
    Fragment(AudioFragment),
    /// Sent exactly once, after the last fragment
    Complete(PipelineSummary),
}
