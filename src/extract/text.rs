//! Whitespace and blank-line canonicalization shared by every extractor.
//!
//! Two distinct rules live here and must not be confused:
//! - [`collapse_inline`] folds whitespace *inside* a text node (HTML layout
//!   whitespace) and is never applied to code regions.
//! - [`NormalizeWhitespace`] works on rendered output line by line: it strips
//!   trailing blanks and limits runs of newlines, leaving indentation alone.

/// Start of a protected code region token. Private-use code point, never
/// emitted by [`collapse_inline`].
pub(crate) const SENTINEL_OPEN: char = '\u{E000}';
/// End of a protected code region token.
pub(crate) const SENTINEL_CLOSE: char = '\u{E001}';

/// Collapses layout whitespace inside a text node.
///
/// - Non-breaking spaces become regular spaces
/// - Any run of whitespace (including source line breaks) becomes one space
/// - Sentinel code points are removed so text cannot forge a code region
pub fn collapse_inline(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_space = false;

    for c in text.chars() {
        if c == SENTINEL_OPEN || c == SENTINEL_CLOSE {
            continue;
        }
        if c == '\u{00A0}' || c.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            prev_space = false;
            result.push(c);
        }
    }
    result
}

/// Normalizes line structure of rendered text.
///
/// - Removes trailing spaces and tabs from every line
/// - Limits consecutive newlines to a configurable maximum
/// - Trims the result
#[derive(Debug, Clone, Copy)]
pub struct NormalizeWhitespace {
    max_consecutive_newlines: usize,
}

impl NormalizeWhitespace {
    /// Create a new whitespace normalizer.
    pub fn new(max_consecutive_newlines: usize) -> Self {
        Self {
            max_consecutive_newlines: max_consecutive_newlines.max(1),
        }
    }

    /// Apply the normalization, returning a new string.
    pub fn apply(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut newline_count = 0;

        for line in text.split('\n') {
            let line = line.trim_end_matches([' ', '\t', '\r', '\u{00A0}']);
            if line.is_empty() {
                newline_count += 1;
                continue;
            }
            if !result.is_empty() {
                let breaks = (newline_count + 1).min(self.max_consecutive_newlines);
                for _ in 0..breaks {
                    result.push('\n');
                }
            }
            newline_count = 0;
            result.push_str(line);
        }

        result.trim().to_string()
    }
}

impl Default for NormalizeWhitespace {
    /// At most one blank line between blocks.
    fn default() -> Self {
        Self::new(2)
    }
}

/// Canonical form for rendered blocks: one blank line max, trimmed.
pub fn normalize_block(text: &str) -> String {
    NormalizeWhitespace::default().apply(text)
}

/// Character length used by every length threshold.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
