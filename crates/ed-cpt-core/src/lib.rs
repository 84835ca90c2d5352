//! ED CPT Core Library
//!
//! Rule-based CPT code extraction from emergency department encounter notes.
//!
//! # Architecture
//!
//! ```text
//! Raw note ──────────────────────────────────────────────┐
//!     │                                                  │
//!     ▼                                                  ▼
//! Normalization                                 Complexity Analysis
//!     │                                                  │
//!     ▼                                                  │
//! Per-code Scoring  ◄── Knowledge Base (compiled once)   │
//!     │                                                  │
//!     ▼                                                  │
//! Inclusion Threshold (> 0.3)                            │
//!     │                                                  │
//!     ▼                                                  │
//! ┌───────────────────────────────┐                      │
//! │        Business Rules         │                      │
//! │  1. one E&M code              │                      │
//! │  2. procedures > 0.5          │                      │
//! │  3. best code per family      │                      │
//! └───────────────┬───────────────┘                      │
//!                 │                                      │
//!                 ▼                                      ▼
//!            Final codes ──────────────────────► Recommendations
//!                                                        │
//!                                                        ▼
//!                                                  Coding Report
//! ```
//!
//! # Core Principle
//!
//! **Extraction is advisory.** Every report is meant for a human coder; low-confidence
//! and incomplete code sets are flagged, never silently accepted.
//!
//! # Modules
//!
//! - [`models`]: Domain types (CodeDefinition, CandidateMatch, NoteAnalysis, etc.)
//! - [`knowledge`]: Read-only CPT knowledge base with pre-compiled patterns
//! - [`extractor`]: Extraction pipeline (normalizer + scorer + business rules)
//! - [`report`]: Complexity analysis, recommendations and exportable reports
//! - [`config`]: Extractor thresholds

pub mod config;
pub mod extractor;
pub mod knowledge;
pub mod models;
pub mod report;

// Re-export commonly used types
pub use config::{ConfigError, ExtractorConfig, ThresholdOverrides};
pub use extractor::{Extractor, NormalizedNote, Normalizer};
pub use knowledge::{CompiledCode, KnowledgeBase, KnowledgeBaseError};
pub use models::{
    CandidateMatch, CodeDefinition, ComplexityLevel, NoteAnalysis, ProcedureCategory,
    ScoreBreakdown,
};
pub use report::{CodingReport, ReportCode};

/// Top-level error for loading extraction resources.
#[derive(Debug, thiserror::Error)]
pub enum CptError {
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type CptResult<T> = Result<T, CptError>;

/// Load the bundled knowledge base and validate a config in one step.
pub fn load_bundled(config: ExtractorConfig) -> CptResult<(KnowledgeBase, ExtractorConfig)> {
    let knowledge_base = KnowledgeBase::bundled()?;
    config.validate()?;
    Ok((knowledge_base, config))
}
