//! Coding report for a single note.

use serde::{Deserialize, Serialize};

use crate::models::{CandidateMatch, NoteAnalysis};

/// Extraction result with analysis and recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingReport {
    /// Unique report identifier
    pub report_id: String,
    /// Analysis timestamp (RFC 3339)
    pub analyzed_at: String,
    /// Fingerprint of the knowledge base that produced the codes
    pub knowledge_base_fingerprint: String,
    /// Final codes, highest confidence first
    pub cpt_codes: Vec<ReportCode>,
    /// Characteristics of the raw note
    pub note_analysis: NoteAnalysis,
    /// Number of final codes
    pub total_codes_found: usize,
    /// Highest unrounded confidence, or 0.0 when no codes were found
    pub highest_confidence: f64,
    /// Advisory strings for the reviewer
    pub recommendations: Vec<String>,
}

/// Single code line in a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportCode {
    /// CPT code
    pub code: String,
    /// Code description
    pub description: String,
    /// Category display name
    pub category: String,
    /// Confidence rounded to three decimals
    pub confidence: f64,
}

impl From<&CandidateMatch> for ReportCode {
    fn from(candidate: &CandidateMatch) -> Self {
        Self {
            code: candidate.code.clone(),
            description: candidate.description.clone(),
            category: candidate.category.display_name().to_string(),
            confidence: round_confidence(candidate.confidence),
        }
    }
}

impl CodingReport {
    /// Build a report from the final code set.
    pub fn new(
        codes: &[CandidateMatch],
        note_analysis: NoteAnalysis,
        recommendations: Vec<String>,
        knowledge_base_fingerprint: &str,
    ) -> Self {
        let highest_confidence = codes
            .iter()
            .map(|c| c.confidence)
            .fold(0.0, f64::max);

        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            knowledge_base_fingerprint: knowledge_base_fingerprint.to_string(),
            cpt_codes: codes.iter().map(ReportCode::from).collect(),
            note_analysis,
            total_codes_found: codes.len(),
            highest_confidence,
            recommendations,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format, one row per code.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("report_id,analyzed_at,code,description,category,confidence,estimated_complexity,kb_fingerprint\n");

        // Lines
        for code in &self.cpt_codes {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                escape_csv(&self.report_id),
                escape_csv(&self.analyzed_at),
                escape_csv(&code.code),
                escape_csv(&code.description),
                escape_csv(&code.category),
                code.confidence,
                self.note_analysis.estimated_complexity,
                escape_csv(&self.knowledge_base_fingerprint),
            ));
        }

        csv
    }
}

/// Round a confidence to three decimal places for display.
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 1000.0
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
