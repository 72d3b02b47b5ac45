//! Provider-facing text cleanup.
//!
//! Deepgram accepts arbitrary UTF-8, but markdown emphasis markers coming out of
//! a language model are read aloud literally. The sanitizer removes a small
//! denylist of such characters from every chunk before it reaches the
//! segmenter. It never buffers across calls, so chunk boundaries are preserved.

use std::borrow::Cow;

/// Characters removed when no explicit denylist is configured.
pub const DEFAULT_STRIP_CHARS: &[char] = &['*'];

/// Removes characters the synthesis provider should never see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSanitizer {
    denylist: Vec<char>,
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_STRIP_CHARS.iter().copied())
    }
}

impl TextSanitizer {
    /// Create a sanitizer stripping the given characters.
    pub fn new(denylist: impl IntoIterator<Item = char>) -> Self {
        let mut denylist: Vec<char> = denylist.into_iter().collect();
        denylist.sort_unstable();
        denylist.dedup();
        Self { denylist }
    }

    /// Characters this sanitizer removes.
    pub fn denylist(&self) -> &[char] {
        &self.denylist
    }

    /// Clean a single chunk.
    ///
    /// Returns the input unchanged (borrowed) when it holds no denied character.
    pub fn sanitize<'a>(&self, chunk: &'a str) -> Cow<'a, str> {
        if self.denylist.is_empty() || !chunk.contains(self.denylist.as_slice()) {
            return Cow::Borrowed(chunk);
        }
        Cow::Owned(
            chunk
                .chars()
                .filter(|c| self.denylist.binary_search(c).is_err())
                .collect(),
        )
    }
}
