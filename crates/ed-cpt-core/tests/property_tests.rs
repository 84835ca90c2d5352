//! Property tests for extraction invariants.

use std::collections::HashSet;
use std::sync::OnceLock;

use proptest::prelude::*;

use ed_cpt_core::extractor::{ConfidenceScorer, Extractor, Normalizer};
use ed_cpt_core::knowledge::KnowledgeBase;
use ed_cpt_core::models::{CandidateMatch, CodeDefinition, ProcedureCategory};

/// Vocabulary mixing knowledge base phrases with clinical filler.
const VOCABULARY: &[&str] = &[
    "simple repair",
    "superficial wound",
    "sutures",
    "laceration",
    "thoracentesis",
    "ultrasound guidance",
    "closed reduction",
    "distal radial fracture",
    "manipulation",
    "splint",
    "short arm splint",
    "venipuncture",
    "foley catheter",
    "nasogastric tube",
    "corneal foreign body",
    "slit lamp",
    "incision and drainage",
    "abscess",
    "lumbar puncture",
    "critical",
    "high risk",
    "minor",
    "evaluated",
    "patient",
    "presents with",
    "discharged home",
    "no acute distress",
    "3 cm",
    "left hand",
    "x-ray",
    "\n",
    ".",
    ";",
];

fn note_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..40).prop_map(|words| words.join(" "))
}

/// Bundled knowledge base, compiled once for the whole test binary.
fn bundled() -> &'static KnowledgeBase {
    static KB: OnceLock<KnowledgeBase> = OnceLock::new();
    KB.get_or_init(|| KnowledgeBase::bundled().unwrap())
}

/// Bundled codes plus a handful of emergency department E&M levels.
fn with_evaluation() -> &'static KnowledgeBase {
    static KB: OnceLock<KnowledgeBase> = OnceLock::new();
    KB.get_or_init(build_knowledge_base_with_evaluation)
}

fn build_knowledge_base_with_evaluation() -> KnowledgeBase {
    let bundled = bundled();
    let mut definitions: Vec<CodeDefinition> =
        bundled.iter().map(|c| c.definition().clone()).collect();

    let levels = [
        ("99282", vec!["minor", "evaluated"]),
        ("99283", vec!["patient", "presents with", "evaluated"]),
        ("99284", vec!["high risk", "patient"]),
        ("99285", vec!["critical", "high risk"]),
    ];
    for (code, keywords) in levels {
        let mut def = CodeDefinition::new(
            code.into(),
            format!("Emergency department visit level {}", code),
            ProcedureCategory::EvaluationAndManagement,
        );
        def.keywords = keywords.into_iter().map(String::from).collect();
        def.patterns = vec![r"critical\s+care".into()];
        definitions.push(def);
    }

    KnowledgeBase::from_definitions(definitions).unwrap()
}

fn assert_final_set_invariants(codes: &[CandidateMatch]) -> Result<(), TestCaseError> {
    let mut families = HashSet::new();
    for code in codes {
        prop_assert!(code.confidence > 0.3 && code.confidence <= 1.0, "{} at {}", code.code, code.confidence);
        if !code.is_evaluation() {
            prop_assert!(code.confidence > 0.5, "{} at {}", code.code, code.confidence);
        }
        prop_assert!(families.insert(code.family_key()), "duplicate family for {}", code.code);
    }

    prop_assert!(codes.iter().filter(|c| c.is_evaluation()).count() <= 1);

    for pair in codes.windows(2) {
        prop_assert!(pair[0].confidence >= pair[1].confidence);
    }
    Ok(())
}

proptest! {
    #[test]
    fn final_codes_respect_business_rules(note in note_strategy()) {
        let codes = Extractor::new(bundled()).extract(&note);
        assert_final_set_invariants(&codes)?;
    }

    #[test]
    fn final_codes_respect_business_rules_with_evaluation(note in note_strategy()) {
        let codes = Extractor::new(with_evaluation()).extract(&note);
        assert_final_set_invariants(&codes)?;
    }

    #[test]
    fn extraction_is_idempotent(note in note_strategy()) {
        let extractor = Extractor::new(with_evaluation());
        prop_assert_eq!(extractor.extract(&note), extractor.extract(&note));
    }

    #[test]
    fn appending_keyword_never_lowers_confidence(
        note in note_strategy(),
        code_index in 0usize..74,
        keyword_index in 0usize..16,
    ) {
        let kb = bundled();
        let normalizer = Normalizer::new();
        let scorer = ConfidenceScorer::new();

        let code = kb.iter().nth(code_index % kb.len()).unwrap();
        let keywords = &code.definition().keywords;
        let keyword = &keywords[keyword_index % keywords.len()];

        let before = scorer.score(&normalizer.normalize(&note), code);
        let extended = format!("{} {}", note, keyword);
        let after = scorer.score(&normalizer.normalize(&extended), code);

        prop_assert!(after.confidence >= before.confidence);

        // Keywords with stripped characters (such as "i&d") can never match
        if keyword.chars().all(|c| c.is_alphanumeric() || " -.,:;()/".contains(c)) {
            prop_assert!(after.score_breakdown.keywords_matched >= 1);
        }
    }

    #[test]
    fn normalized_text_is_canonical(text in "[ -~\t\n]{0,200}") {
        let normalizer = Normalizer::new();
        let normalized = normalizer.normalize(&text);
        let s = normalized.as_str();

        prop_assert_eq!(s, s.trim());
        let allowed = s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || " _-.,:;()/".contains(c));
        prop_assert!(allowed, "unexpected characters in {:?}", s);

        // A second pass only collapses spaces left behind by stripped characters
        let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let again = normalizer.normalize(s);
        prop_assert_eq!(again.as_str(), collapsed.as_str());
    }

    #[test]
    fn word_count_matches_whitespace_split(note in note_strategy()) {
        let report = Extractor::new(bundled()).extract_with_details(&note);
        prop_assert_eq!(report.note_analysis.word_count, note.split_whitespace().count());
        prop_assert_eq!(report.total_codes_found, report.cpt_codes.len());
    }
}
