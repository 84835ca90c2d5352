//! Extractor thresholds.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Candidates at or below this confidence are discarded.
pub const DEFAULT_INCLUSION_THRESHOLD: f64 = 0.3;

/// Non-E&M codes at or below this confidence do not reach the final set.
pub const DEFAULT_PROCEDURE_THRESHOLD: f64 = 0.5;

/// Final codes below this confidence trigger a manual-review recommendation.
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.6;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {name}: {value} (must be within 0.0 - 1.0)")]
    InvalidThreshold { name: &'static str, value: f64 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Deployment-tunable thresholds for extraction and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Minimum (exclusive) confidence for a code to become a candidate
    pub inclusion_threshold: f64,
    /// Minimum (exclusive) confidence for a non-E&M code to survive refinement
    pub procedure_threshold: f64,
    /// Confidence below which a final code is flagged for manual review
    pub review_threshold: f64,
}

/// Per-threshold overrides, e.g. from command-line flags. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverrides {
    pub inclusion_threshold: Option<f64>,
    pub procedure_threshold: Option<f64>,
    pub review_threshold: Option<f64>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            inclusion_threshold: DEFAULT_INCLUSION_THRESHOLD,
            procedure_threshold: DEFAULT_PROCEDURE_THRESHOLD,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
        }
    }
}

impl ExtractorConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replace any threshold given in `overrides`, then validate the result.
    pub fn with_overrides(mut self, overrides: ThresholdOverrides) -> ConfigResult<Self> {
        if let Some(value) = overrides.inclusion_threshold {
            self.inclusion_threshold = value;
        }
        if let Some(value) = overrides.procedure_threshold {
            self.procedure_threshold = value;
        }
        if let Some(value) = overrides.review_threshold {
            self.review_threshold = value;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that every threshold is a finite value in [0.0, 1.0].
    pub fn validate(&self) -> ConfigResult<()> {
        check_threshold("inclusion_threshold", self.inclusion_threshold)?;
        check_threshold("procedure_threshold", self.procedure_threshold)?;
        check_threshold("review_threshold", self.review_threshold)?;
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}
