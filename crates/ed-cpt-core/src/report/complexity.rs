//! Note complexity estimation.

use crate::models::{ComplexityLevel, NoteAnalysis};

/// Phrases that suggest a high-complexity encounter.
pub const HIGH_COMPLEXITY_INDICATORS: [&str; 7] = [
    "critical",
    "life threatening",
    "multiple systems",
    "extensive",
    "comprehensive",
    "complex decision making",
    "high risk",
];

/// Estimates encounter complexity from raw note text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityAnalyzer;

impl ComplexityAnalyzer {
    /// Create a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Count words and indicator phrases in a raw (non-normalized) note.
    pub fn analyze(&self, text: &str) -> NoteAnalysis {
        let lower = text.to_lowercase();
        let complexity_indicators = HIGH_COMPLEXITY_INDICATORS
            .iter()
            .filter(|indicator| lower.contains(*indicator))
            .count();

        NoteAnalysis {
            word_count: text.split_whitespace().count(),
            complexity_indicators,
            estimated_complexity: ComplexityLevel::from_indicator_count(complexity_indicators),
        }
    }
}
