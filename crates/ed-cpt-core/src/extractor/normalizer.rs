//! Encounter note normalizer.
//!
//! Handles:
//! - Lowercasing
//! - Whitespace collapsing (tabs, newlines, runs of spaces → one space)
//! - Stripping characters outside the allow-list (word characters, whitespace,
//!   and `- . , : ; ( ) /`)

use std::fmt;

use regex::Regex;

/// Note text after normalization. Only [`Normalizer`] can produce one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedNote(String);

impl NormalizedNote {
    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for NormalizedNote {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizer for raw note text.
#[derive(Debug, Clone)]
pub struct Normalizer {
    whitespace: Regex,
    disallowed: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
            disallowed: Regex::new(r"[^\w\s.,:;()/-]").expect("allow-list pattern is valid"),
        }
    }

    /// Normalize a raw note.
    ///
    /// Disallowed characters become spaces rather than vanishing, so `"3cm!"`
    /// and `"3cm"` differ only in trailing whitespace, which is trimmed.
    ///
    /// Whitespace is collapsed before characters are stripped, so a stripped
    /// character between spaces leaves a run of spaces: `"chest & tap"` becomes
    /// `"chest   tap"`.
    pub fn normalize(&self, text: &str) -> NormalizedNote {
        let lower = text.to_lowercase();
        let collapsed = self.whitespace.replace_all(&lower, " ");
        let cleaned = self.disallowed.replace_all(&collapsed, " ");
        NormalizedNote(cleaned.trim().to_string())
    }
}
