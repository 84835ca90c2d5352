//! Per-code confidence scoring.
//!
//! Scoring weights:
//! - Keyword presence ratio: 60%
//! - Pattern match ratio: 40%
//!
//! The combined score is capped at 1.0.

use crate::knowledge::CompiledCode;
use crate::models::{CandidateMatch, ScoreBreakdown};

use super::NormalizedNote;

/// Scores one knowledge base code against one normalized note.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    /// Create a new scorer.
    pub fn new() -> Self {
        Self
    }

    /// Score a code and wrap it as a candidate.
    pub fn score(&self, note: &NormalizedNote, code: &CompiledCode) -> CandidateMatch {
        let breakdown = self.breakdown(note, code);
        let definition = code.definition();

        CandidateMatch {
            code: definition.code.clone(),
            description: definition.description.clone(),
            category: definition.category,
            confidence: breakdown.weighted_score(),
            score_breakdown: breakdown,
        }
    }

    /// Count keyword and pattern evidence for a code.
    pub fn breakdown(&self, note: &NormalizedNote, code: &CompiledCode) -> ScoreBreakdown {
        let keywords = &code.definition().keywords;

        ScoreBreakdown {
            keywords_matched: self.count_keywords(note, keywords),
            keyword_count: keywords.len(),
            patterns_matched: self.count_patterns(note, code),
            pattern_count: code.patterns().len(),
        }
    }

    /// Number of keywords occurring anywhere in the note, case-insensitively.
    fn count_keywords(&self, note: &NormalizedNote, keywords: &[String]) -> usize {
        keywords
            .iter()
            .filter(|keyword| note.as_str().contains(&keyword.to_lowercase()))
            .count()
    }

    /// Number of patterns with at least one match in the note.
    fn count_patterns(&self, note: &NormalizedNote, code: &CompiledCode) -> usize {
        code.patterns()
            .iter()
            .filter(|pattern| pattern.is_match(note.as_str()))
            .count()
    }
}
