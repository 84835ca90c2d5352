//! CPT code definition models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading identifier characters that make up a code family.
pub const FAMILY_PREFIX_LEN: usize = 3;

/// Billing category of a CPT code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureCategory {
    /// Visit-level code, at most one per encounter
    EvaluationAndManagement,
    Procedures,
    Radiology,
    Laboratory,
    Injections,
    WoundCare,
}

impl ProcedureCategory {
    /// Every category, in declaration order.
    pub const ALL: [ProcedureCategory; 6] = [
        ProcedureCategory::EvaluationAndManagement,
        ProcedureCategory::Procedures,
        ProcedureCategory::Radiology,
        ProcedureCategory::Laboratory,
        ProcedureCategory::Injections,
        ProcedureCategory::WoundCare,
    ];

    /// Human-readable name used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProcedureCategory::EvaluationAndManagement => "Evaluation and Management",
            ProcedureCategory::Procedures => "Procedures",
            ProcedureCategory::Radiology => "Radiology",
            ProcedureCategory::Laboratory => "Laboratory",
            ProcedureCategory::Injections => "Injections",
            ProcedureCategory::WoundCare => "Wound Care",
        }
    }

    /// Tag used in knowledge base files and on the command line.
    pub fn tag(&self) -> &'static str {
        match self {
            ProcedureCategory::EvaluationAndManagement => "evaluation_and_management",
            ProcedureCategory::Procedures => "procedures",
            ProcedureCategory::Radiology => "radiology",
            ProcedureCategory::Laboratory => "laboratory",
            ProcedureCategory::Injections => "injections",
            ProcedureCategory::WoundCare => "wound_care",
        }
    }

    /// Check if this is the evaluation-and-management category.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, ProcedureCategory::EvaluationAndManagement)
    }
}

impl fmt::Display for ProcedureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when a category name is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown procedure category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for ProcedureCategory {
    type Err = ParseCategoryError;

    /// Accepts either the tag (`wound_care`) or the display name (`Wound Care`),
    /// case-insensitively. Hyphens and spaces are treated like underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        ProcedureCategory::ALL
            .into_iter()
            .find(|c| c.tag() == wanted || c.display_name().to_lowercase().replace(' ', "_") == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A single entry in the CPT knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeDefinition {
    /// CPT code identifier - unique within a knowledge base
    pub code: String,
    /// Official code description
    pub description: String,
    /// Billing category
    pub category: ProcedureCategory,
    /// Phrases whose presence supports this code
    pub keywords: Vec<String>,
    /// Case-insensitive regular expressions whose match supports this code
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl CodeDefinition {
    /// Create a new code definition with no keywords or patterns.
    pub fn new(code: String, description: String, category: ProcedureCategory) -> Self {
        Self {
            code,
            description,
            category,
            keywords: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Family prefix used to group related codes.
    pub fn family(&self) -> &str {
        code_family(&self.code)
    }
}

/// First [`FAMILY_PREFIX_LEN`] characters of a code, or the whole code if shorter.
pub fn code_family(code: &str) -> &str {
    match code.char_indices().nth(FAMILY_PREFIX_LEN) {
        Some((end, _)) => &code[..end],
        None => code,
    }
}
