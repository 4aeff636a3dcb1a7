//! Punctuation-based sentence segmentation.
//!
//! A boundary is a `.`, `?` or `!` followed by whitespace or end of text.
//! Abbreviations, decimals and quoted dialogue are not special-cased.

use serde::{Deserialize, Serialize};

/// Exclusive length bounds for a kept sentence, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBounds {
    /// Sentences must be longer than this
    pub min_chars: usize,

    /// Sentences must be shorter than this
    pub max_chars: usize,
}

impl Default for SentenceBounds {
    fn default() -> Self {
        Self {
            min_chars: 30,
            max_chars: 400,
        }
    }
}

impl SentenceBounds {
    /// Whether a trimmed candidate falls strictly inside the bounds
    pub fn accepts(&self, candidate: &str) -> bool {
        let len = candidate.chars().count();
        len > self.min_chars && len < self.max_chars
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

/// Split flattened text into sentences that pass `bounds`.
///
/// Returned slices borrow from `text`, are trimmed, and keep their
/// terminating punctuation. Order follows the input.
pub fn split_sentences<'a>(text: &'a str, bounds: &SentenceBounds) -> Vec<&'a str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if !at_boundary {
            continue;
        }

        let end = idx + c.len_utf8();
        let candidate = text[start..end].trim();
        if bounds.accepts(candidate) {
            sentences.push(candidate);
        }
        start = end;
    }

    sentences
}
