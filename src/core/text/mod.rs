//! Text preprocessing for streamed synthesis.
//!
//! - [`TextSanitizer`] removes characters the provider should not receive.
//! - [`SentenceSegmenter`] turns an arbitrarily chunked text stream into
//!   complete sentences.

mod sanitizer;
mod segmenter;

pub use sanitizer::{DEFAULT_STRIP_CHARS, TextSanitizer};
pub use segmenter::{
    DEFAULT_MAX_SENTENCE_CHARS, DEFAULT_SEARCH_EXTENSION, SegmenterConfig, Sentence,
    SentenceSegmenter, Sentences, is_speakable, sentence_stream,
};
