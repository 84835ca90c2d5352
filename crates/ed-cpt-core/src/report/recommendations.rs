//! Coding recommendations for reviewers.

use crate::models::{CandidateMatch, NoteAnalysis};

/// E&M codes that satisfy a high-complexity note.
pub const HIGH_LEVEL_EM_CODES: [&str; 2] = ["99284", "99285"];

/// Indicator count at which a note is expected to carry a high-level E&M code.
const HIGH_LEVEL_INDICATOR_COUNT: usize = 2;

pub const NO_CODES_FOUND: &str =
    "No CPT codes identified. Consider reviewing documentation for missed procedures or evaluations.";
pub const HIGH_COMPLEXITY_WITHOUT_HIGH_LEVEL_EM: &str =
    "Note suggests high complexity but no high-level E&M code identified. Review for appropriate E&M level.";
pub const NO_EVALUATION_CODE: &str =
    "No evaluation and management code identified. Every ED visit should have an E&M code.";
pub const LOW_CONFIDENCE_CODES: &str =
    "Some codes have lower confidence scores. Manual review recommended.";

/// Produces advisory strings from the final code set.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationGenerator {
    review_threshold: f64,
}

impl RecommendationGenerator {
    /// Create a generator that flags codes below `review_threshold`.
    pub fn new(review_threshold: f64) -> Self {
        Self { review_threshold }
    }

    /// Generate recommendations, in a fixed order.
    pub fn generate(&self, codes: &[CandidateMatch], analysis: &NoteAnalysis) -> Vec<String> {
        let mut recommendations = Vec::new();

        if codes.is_empty() {
            recommendations.push(NO_CODES_FOUND.to_string());
        }

        let has_high_level_em = codes
            .iter()
            .any(|c| HIGH_LEVEL_EM_CODES.contains(&c.code.as_str()));
        if analysis.complexity_indicators >= HIGH_LEVEL_INDICATOR_COUNT && !has_high_level_em {
            recommendations.push(HIGH_COMPLEXITY_WITHOUT_HIGH_LEVEL_EM.to_string());
        }

        if !codes.iter().any(|c| c.is_evaluation()) {
            recommendations.push(NO_EVALUATION_CODE.to_string());
        }

        if codes.iter().any(|c| c.confidence < self.review_threshold) {
            recommendations.push(LOW_CONFIDENCE_CODES.to_string());
        }

        recommendations
    }
}
