//! Incremental sentence segmentation.
//!
//! Text arrives in arbitrary chunks (often single LLM tokens). The segmenter
//! keeps the not-yet-classified suffix in a buffer and extracts complete
//! sentences as soon as they can be recognized:
//!
//! 1. digit-dot-digit sequences are masked so decimal points are never
//!    mistaken for a full stop;
//! 2. the first `.`, `!` or `?` that is not directly preceded by a digit ends a
//!    sentence (this also keeps list markers such as `1.` attached);
//! 3. without a terminator, a buffer longer than `max_chars` is split at the last
//!    whitespace inside `max_chars + search_extension` characters, or hard-split
//!    at `max_chars` when there is none.
//!
//! Extracted text without any word character (`"..."`, `"!!"`) is dropped.
//! Abbreviations such as `"Dr."` are treated as sentence ends.

use std::borrow::Cow;
use std::fmt;

use futures::{Stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, warn};

use super::sanitizer::TextSanitizer;
use crate::core::pipeline::PipelineError;

/// Default buffer length (in characters) before the length fallback applies.
pub const DEFAULT_MAX_SENTENCE_CHARS: usize = 200;

/// Default number of extra characters searched for a word boundary.
pub const DEFAULT_SEARCH_EXTENSION: usize = 20;

/// Stand-in for a decimal point while searching for terminators.
/// A private-use code point keeps character counts identical to the input.
const DECIMAL_PLACEHOLDER: char = '\u{E000}';

static DECIMAL_POINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\.(\d)").expect("valid decimal regex"));

static TERMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)([.!?])").expect("valid terminator regex"));

static WORD_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w").expect("valid word regex"));

/// Length limits for the run-on fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Buffer length (characters) above which a run-on buffer is force-split
    pub max_chars: usize,
    /// Extra characters scanned for whitespace beyond `max_chars`
    pub search_extension: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_SENTENCE_CHARS,
            search_extension: DEFAULT_SEARCH_EXTENSION,
        }
    }
}

/// A unit of text synthesized as one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence(String);

impl Sentence {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sentence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether `text` is worth synthesizing at all.
pub fn is_speakable(text: &str) -> bool {
    WORD_CHAR.is_match(text)
}

/// Stateful sentence scanner over a growing buffer.
///
/// One instance serves exactly one stream; construct a new one to restart.
#[derive(Debug, Default)]
pub struct SentenceSegmenter {
    buffer: String,
    config: SegmenterConfig,
    emitted: usize,
}

impl SentenceSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            buffer: String::new(),
            config,
            emitted: 0,
        }
    }

    /// Text received but not yet classified.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Sentences emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Append a chunk and iterate over every sentence it completes.
    ///
    /// Sentences not pulled from the iterator stay in the buffer and are
    /// returned by the next `push` or `finish`.
    pub fn push(&mut self, chunk: &str) -> Sentences<'_> {
        self.buffer.push_str(chunk);
        Sentences { segmenter: self }
    }

    /// Flush the remaining buffer at end of input.
    pub fn finish(mut self) -> Option<Sentence> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = rest.trim();
        let last = if is_speakable(rest) {
            self.emitted += 1;
            Some(Sentence(rest.to_string()))
        } else {
            None
        };

        if self.emitted == 0 {
            warn!("No sentence was generated for synthesis from the received text");
        }
        last
    }

    /// Split one sentence off the front of `buffer`.
    ///
    /// Returns the trimmed sentence and the remainder with its leading
    /// whitespace removed, or `None` when more input is needed.
    fn extract(&self, buffer: &str) -> Option<(String, String)> {
        if buffer.is_empty() {
            return None;
        }

        let masked = DECIMAL_POINT.replace_all(buffer, |caps: &regex::Captures<'_>| {
            format!("{}{DECIMAL_PLACEHOLDER}{}", &caps[1], &caps[2])
        });

        let split_at = match TERMINATOR.captures(&masked).and_then(|caps| caps.get(1)) {
            Some(mark) => mark.end(),
            None => self.fallback_split(&masked)?,
        };

        // trailing whitespace of the remainder stays buffered so the next
        // chunk does not run into the last word
        let (head, tail) = masked.split_at(split_at);
        Some((
            restore(head).trim().to_string(),
            restore(tail).trim_start().to_string(),
        ))
    }

    /// Byte offset of the length-based split, if the buffer is long enough.
    fn fallback_split(&self, masked: &str) -> Option<usize> {
        let max_chars = self.config.max_chars;
        if masked.chars().count() <= max_chars {
            return None;
        }

        let window_end = byte_offset(masked, max_chars + self.config.search_extension);
        let boundary = masked[..window_end]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, _)| idx);

        match boundary {
            Some(idx) if idx > 0 => Some(idx),
            _ => Some(byte_offset(masked, max_chars)),
        }
    }
}

/// Iterator returned by [`SentenceSegmenter::push`].
pub struct Sentences<'a> {
    segmenter: &'a mut SentenceSegmenter,
}

impl Iterator for Sentences<'_> {
    type Item = Sentence;

    fn next(&mut self) -> Option<Sentence> {
        loop {
            let (sentence, rest) = self.segmenter.extract(&self.segmenter.buffer)?;

            if rest.len() >= self.segmenter.buffer.len() {
                let err = PipelineError::SentenceExtraction(format!(
                    "extraction made no progress on a {}-byte buffer",
                    rest.len()
                ));
                error!(error = %err, "Sentence segmentation stalled");
                return None;
            }
            self.segmenter.buffer = rest;

            if is_speakable(&sentence) {
                self.segmenter.emitted += 1;
                return Some(Sentence(sentence));
            }
        }
    }
}

/// Sanitize and segment a stream of text chunks.
///
/// The returned stream ends after the input ends and the leftover buffer has
/// been flushed.
pub fn sentence_stream<S, T>(
    chunks: S,
    sanitizer: TextSanitizer,
    config: SegmenterConfig,
) -> impl Stream<Item = Sentence> + Send
where
    S: Stream<Item = T> + Send,
    T: AsRef<str> + Send,
{
    async_stream::stream! {
        let mut segmenter = SentenceSegmenter::new(config);
        let mut chunks = std::pin::pin!(chunks);

        while let Some(chunk) = chunks.next().await {
            let cleaned = sanitizer.sanitize(chunk.as_ref()).into_owned();
            for sentence in segmenter.push(&cleaned) {
                yield sentence;
            }
        }

        if let Some(last) = segmenter.finish() {
            yield last;
        }
    }
}

fn restore(text: &str) -> Cow<'_, str> {
    if text.contains(DECIMAL_PLACEHOLDER) {
        Cow::Owned(text.replace(DECIMAL_PLACEHOLDER, "."))
    } else {
        Cow::Borrowed(text)
    }
}

/// Byte offset of the `n`th character, clamped to the string length.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
