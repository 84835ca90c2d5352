//! CPT knowledge base.
//!
//! The knowledge base is a read-only table of [`CodeDefinition`]s keyed by code
//! identifier. Every pattern is compiled exactly once, when the table is built;
//! after that the table is never mutated and can be shared freely across threads.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{CodeDefinition, ProcedureCategory};

/// Emergency-department code table bundled with the crate.
const BUNDLED_CODES: &str = include_str!("../../data/ed_cpt_codes.json");

/// Knowledge base load errors.
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern for code {code}: {pattern}")]
    InvalidPattern {
        code: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    #[error("Code definition with empty identifier")]
    EmptyCode,
}

pub type KnowledgeBaseResult<T> = Result<T, KnowledgeBaseError>;

/// A code definition with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledCode {
    definition: CodeDefinition,
    patterns: Vec<Regex>,
}

impl CompiledCode {
    fn compile(definition: CodeDefinition) -> KnowledgeBaseResult<Self> {
        let patterns = definition
            .patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| KnowledgeBaseError::InvalidPattern {
                        code: definition.code.clone(),
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<KnowledgeBaseResult<Vec<_>>>()?;

        Ok(Self {
            definition,
            patterns,
        })
    }

    /// The source definition.
    pub fn definition(&self) -> &CodeDefinition {
        &self.definition
    }

    /// Compiled patterns, in definition order.
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// The CPT code identifier.
    pub fn code(&self) -> &str {
        &self.definition.code
    }

    /// The billing category.
    pub fn category(&self) -> ProcedureCategory {
        self.definition.category
    }
}

/// Immutable table of compiled code definitions.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    codes: BTreeMap<String, CompiledCode>,
    fingerprint: String,
}

impl KnowledgeBase {
    /// Load the bundled emergency-department code table.
    pub fn bundled() -> KnowledgeBaseResult<Self> {
        Self::from_json(BUNDLED_CODES)
    }

    /// Load a knowledge base from a JSON array of code definitions.
    pub fn from_json(json: &str) -> KnowledgeBaseResult<Self> {
        let definitions: Vec<CodeDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    /// Load a knowledge base from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> KnowledgeBaseResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build a knowledge base from definitions, compiling every pattern.
    ///
    /// Fails on the first blank identifier, duplicate identifier, or invalid
    /// pattern. A definition without keywords is accepted; its keyword score is
    /// always zero.
    pub fn from_definitions(definitions: Vec<CodeDefinition>) -> KnowledgeBaseResult<Self> {
        let mut codes = BTreeMap::new();

        for definition in definitions {
            if definition.code.trim().is_empty() {
                return Err(KnowledgeBaseError::EmptyCode);
            }
            if codes.contains_key(&definition.code) {
                return Err(KnowledgeBaseError::DuplicateCode(definition.code));
            }
            if definition.keywords.is_empty() {
                tracing::warn!(code = %definition.code, "code definition has no keywords");
            }

            let compiled = CompiledCode::compile(definition)?;
            codes.insert(compiled.code().to_string(), compiled);
        }

        let fingerprint = fingerprint(&codes)?;
        tracing::info!(codes = codes.len(), %fingerprint, "knowledge base loaded");

        Ok(Self { codes, fingerprint })
    }

    /// Look up a code by identifier.
    pub fn get(&self, code: &str) -> Option<&CompiledCode> {
        self.codes.get(code)
    }

    /// All codes in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledCode> {
        self.codes.values()
    }

    /// Codes of one category, in identifier order.
    pub fn by_category(&self, category: ProcedureCategory) -> impl Iterator<Item = &CompiledCode> {
        self.codes.values().filter(move |c| c.category() == category)
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if the knowledge base has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// SHA-256 of the canonical JSON of all definitions, in identifier order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint(codes: &BTreeMap<String, CompiledCode>) -> KnowledgeBaseResult<String> {
    let definitions: Vec<&CodeDefinition> = codes.values().map(|c| &c.definition).collect();
    let payload = serde_json::to_vec(&definitions)?;

    let mut hasher = Sha256::new();
    hasher.update(&payload);
    Ok(hex::encode(hasher.finalize()))
}
