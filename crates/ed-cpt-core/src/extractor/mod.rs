//! CPT code extraction from encounter notes.
//!
//! Pipeline: Normalization → Per-code Scoring → Inclusion Threshold → Business Rules

mod normalizer;
mod rules;
mod scorer;

pub use normalizer::*;
pub use rules::*;
pub use scorer::*;

use crate::config::{ConfigResult, ExtractorConfig};
use crate::knowledge::KnowledgeBase;
use crate::models::{rank_order, CandidateMatch};
use crate::report::{CodingReport, ComplexityAnalyzer, RecommendationGenerator};

/// Main extractor that coordinates the full pipeline.
pub struct Extractor<'a> {
    knowledge_base: &'a KnowledgeBase,
    config: ExtractorConfig,
    normalizer: Normalizer,
    scorer: ConfidenceScorer,
    rules: BusinessRules,
}

impl<'a> Extractor<'a> {
    /// Create an extractor with default thresholds.
    pub fn new(knowledge_base: &'a KnowledgeBase) -> Self {
        Self::build(knowledge_base, ExtractorConfig::default())
    }

    /// Create an extractor with custom thresholds.
    pub fn with_config(knowledge_base: &'a KnowledgeBase, config: ExtractorConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(knowledge_base, config))
    }

    fn build(knowledge_base: &'a KnowledgeBase, config: ExtractorConfig) -> Self {
        Self {
            knowledge_base,
            config,
            normalizer: Normalizer::new(),
            scorer: ConfidenceScorer::new(),
            rules: BusinessRules::new(config.procedure_threshold),
        }
    }

    /// Extract the final CPT code set from a raw note.
    ///
    /// Never fails: empty or unrecognised text yields an empty list.
    pub fn extract(&self, note: &str) -> Vec<CandidateMatch> {
        // Step 1: Normalize once, reuse for every code
        let normalized = self.normalizer.normalize(note);

        // Step 2: Score and rank every code
        let candidates = self.rank_candidates(&normalized);
        let candidate_count = candidates.len();

        // Step 3: Apply business rules
        let refined = self.rules.refine(candidates);

        tracing::debug!(
            note_chars = normalized.as_str().len(),
            candidates = candidate_count,
            codes = refined.len(),
            "extracted CPT codes"
        );

        refined
    }

    /// Normalize a note and return every candidate above the inclusion threshold,
    /// before business rules.
    pub fn explain(&self, note: &str) -> Vec<CandidateMatch> {
        self.rank_candidates(&self.normalizer.normalize(note))
    }

    /// Score every code against a normalized note, keep those strictly above the
    /// inclusion threshold, and sort by confidence descending (ties by code).
    pub fn rank_candidates(&self, note: &NormalizedNote) -> Vec<CandidateMatch> {
        let mut candidates: Vec<CandidateMatch> = self
            .knowledge_base
            .iter()
            .map(|code| self.scorer.score(note, code))
            .filter(|c| c.confidence > self.config.inclusion_threshold)
            .collect();

        candidates.sort_by(rank_order);
        candidates
    }

    /// Extract codes and build a full report with complexity analysis and
    /// recommendations.
    pub fn extract_with_details(&self, note: &str) -> CodingReport {
        let codes = self.extract(note);
        let analysis = ComplexityAnalyzer::new().analyze(note);
        let recommendations =
            RecommendationGenerator::new(self.config.review_threshold).generate(&codes, &analysis);

        CodingReport::new(
            &codes,
            analysis,
            recommendations,
            self.knowledge_base.fingerprint(),
        )
    }

    /// Get the normalizer for direct access.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Active thresholds.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The knowledge base this extractor reads from.
    pub fn knowledge_base(&self) -> &'a KnowledgeBase {
        self.knowledge_base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeDefinition, ProcedureCategory};

    fn emergency_kb() -> KnowledgeBase {
        let mut em_high = CodeDefinition::new(
            "99285".into(),
            "Emergency department visit, high medical decision making".into(),
            ProcedureCategory::EvaluationAndManagement,
        );
        em_high.keywords = vec!["critical".into(), "high risk".into()];
        em_high.patterns = vec![r"critical\s+care".into()];

        let mut em_low = CodeDefinition::new(
            "99282".into(),
            "Emergency department visit, straightforward medical decision making".into(),
            ProcedureCategory::EvaluationAndManagement,
        );
        em_low.keywords = vec!["minor".into(), "evaluated".into()];

        let mut lp = CodeDefinition::new(
            "62270".into(),
            "Spinal puncture, lumbar, diagnostic".into(),
            ProcedureCategory::Procedures,
        );
        lp.keywords = vec!["lumbar puncture".into()];
        lp.patterns = vec![r"lumbar\s+puncture".into()];

        KnowledgeBase::from_definitions(vec![em_high, em_low, lp]).unwrap()
    }

    #[test]
    fn test_extract_with_evaluation_code() {
        let kb = emergency_kb();
        let extractor = Extractor::new(&kb);

        let codes = extractor.extract("Patient evaluated for minor headache. Lumbar puncture performed.");
        let found: Vec<&str> = codes.iter().map(|c| c.code.as_str()).collect();

        // 99282 scores 0.6 (keywords only), 62270 scores 1.0
        assert_eq!(found, vec!["62270", "99282"]);
    }

    #[test]
    fn test_only_best_evaluation_code() {
        let kb = emergency_kb();
        let extractor = Extractor::new(&kb);

        let codes = extractor.extract("Minor complaint evaluated; became critical, high risk, critical care given");
        let em: Vec<&str> = codes
            .iter()
            .filter(|c| c.is_evaluation())
            .map(|c| c.code.as_str())
            .collect();

        assert_eq!(em, vec!["99285"]);
    }

    #[test]
    fn test_inclusion_threshold_is_strict() {
        let kb = emergency_kb();

        // 99285: one of two keywords, no pattern → exactly 0.3
        let config = ExtractorConfig::default();
        let extractor = Extractor::with_config(&kb, config).unwrap();
        let note = extractor.normalizer().normalize("critical");
        assert!(extractor.rank_candidates(&note).is_empty());

        let lenient = ExtractorConfig {
            inclusion_threshold: 0.29,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::with_config(&kb, lenient).unwrap();
        let ranked = extractor.rank_candidates(&note);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].code, "99285");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let kb = emergency_kb();
        let config = ExtractorConfig {
            procedure_threshold: -0.1,
            ..ExtractorConfig::default()
        };
        assert!(Extractor::with_config(&kb, config).is_err());
    }

    #[test]
    fn test_explain_returns_pre_refinement_candidates() {
        let kb = KnowledgeBase::bundled().unwrap();
        let extractor = Extractor::new(&kb);

        let ranked = extractor.explain("Simple repair of superficial wound with sutures, 3 cm");
        let found: Vec<&str> = ranked.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(found, vec!["12001", "12002"]);

        let codes = extractor.extract("Simple repair of superficial wound with sutures, 3 cm");
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].code, "12001");
    }

    #[test]
    fn test_empty_note() {
        let kb = KnowledgeBase::bundled().unwrap();
        let extractor = Extractor::new(&kb);

        assert!(extractor.extract("").is_empty());
        assert!(extractor.explain("").is_empty());
    }

    #[test]
    fn test_extract_with_details() {
        let kb = emergency_kb();
        let extractor = Extractor::new(&kb);

        let report = extractor.extract_with_details("Lumbar puncture performed. Patient evaluated, minor symptoms.");

        assert_eq!(report.total_codes_found, 2);
        assert_eq!(report.knowledge_base_fingerprint, kb.fingerprint());
        assert_eq!(report.highest_confidence, 1.0);
        assert_eq!(report.note_analysis.word_count, 7);
        // 99282 at 0.6 is not below the review threshold and an E&M code is present
        assert!(report.recommendations.is_empty());
    }
}
