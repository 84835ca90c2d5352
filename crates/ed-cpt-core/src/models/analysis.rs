//! Note complexity analysis models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Estimated complexity of an encounter note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Low,
    Moderate,
    High,
}

impl ComplexityLevel {
    /// Derive the level from the number of complexity indicators found.
    pub fn from_indicator_count(count: usize) -> Self {
        match count {
            0 => ComplexityLevel::Low,
            1 | 2 => ComplexityLevel::Moderate,
            _ => ComplexityLevel::High,
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplexityLevel::Low => "Low",
            ComplexityLevel::Moderate => "Moderate",
            ComplexityLevel::High => "High",
        };
        f.write_str(s)
    }
}

/// Characteristics of a raw note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteAnalysis {
    /// Whitespace-separated token count
    pub word_count: usize,
    /// How many complexity indicator phrases appear
    pub complexity_indicators: usize,
    /// Level derived from the indicator count
    pub estimated_complexity: ComplexityLevel,
}
