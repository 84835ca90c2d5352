//! Candidate code matches produced by the extractor.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::code::{code_family, ProcedureCategory};

/// A CPT code scored against one note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMatch {
    /// CPT code identifier
    pub code: String,
    /// Code description from the knowledge base
    pub description: String,
    /// Billing category
    pub category: ProcedureCategory,
    /// Overall confidence score (0.0 - 1.0)
    pub confidence: f64,
    /// Breakdown of scoring factors
    pub score_breakdown: ScoreBreakdown,
}

impl CandidateMatch {
    /// Family prefix of the code.
    pub fn family(&self) -> &str {
        code_family(&self.code)
    }

    /// Deduplication key: (category, family prefix).
    pub fn family_key(&self) -> (ProcedureCategory, &str) {
        (self.category, self.family())
    }

    /// Check if this is an evaluation-and-management code.
    pub fn is_evaluation(&self) -> bool {
        self.category.is_evaluation()
    }
}

/// Ranking order: confidence descending, then code identifier ascending.
///
/// Used for every sort and every "best of" selection so results never depend on
/// knowledge base iteration order.
pub fn rank_order(a: &CandidateMatch, b: &CandidateMatch) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.code.cmp(&b.code))
}

/// Breakdown of how a candidate was scored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Keywords found in the note
    pub keywords_matched: usize,
    /// Keywords defined for the code
    pub keyword_count: usize,
    /// Patterns with at least one match in the note
    pub patterns_matched: usize,
    /// Patterns defined for the code
    pub pattern_count: usize,
}

impl ScoreBreakdown {
    /// Weight of the keyword ratio: 60%
    pub const KEYWORD_WEIGHT: f64 = 0.6;
    /// Weight of the pattern ratio: 40%
    pub const PATTERN_WEIGHT: f64 = 0.4;

    /// Fraction of keywords present (0.0 when the code has none).
    pub fn keyword_ratio(&self) -> f64 {
        if self.keyword_count == 0 {
            return 0.0;
        }
        self.keywords_matched as f64 / self.keyword_count as f64
    }

    /// Fraction of patterns matched, capped at 1.0 (0.0 when the code has none).
    pub fn pattern_ratio(&self) -> f64 {
        if self.pattern_count == 0 {
            return 0.0;
        }
        (self.patterns_matched as f64 / self.pattern_count as f64).min(1.0)
    }

    /// Calculate weighted confidence score, capped at 1.0.
    pub fn weighted_score(&self) -> f64 {
        (self.keyword_ratio() * Self::KEYWORD_WEIGHT + self.pattern_ratio() * Self::PATTERN_WEIGHT)
            .min(1.0)
    }
}
