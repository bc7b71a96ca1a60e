//! Structured ATS analysis — the fixed response shape the UI depends on.
//!
//! Malformed model output is recovered into a degraded-but-valid result so
//! the analyze action never surfaces a hard error for a schema miss.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisIssue {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

/// The contract type for the analyze action. All scores are 0–100.
///
/// Scores are held as raw JSON numbers so a model that answers `78` is
/// echoed back as `78`, not `78.0` — the response must be the upstream
/// JSON unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub overall_score: Number,
    pub formatting_score: Number,
    pub keyword_score: Number,
    pub structure_score: Number,
    pub content_score: Number,
    pub issues: Vec<AnalysisIssue>,
    pub recommended_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

impl AtsAnalysis {
    /// Degraded result returned when the model output cannot be parsed.
    /// Keeps the UI contract satisfied instead of propagating an error.
    pub fn failure_fallback() -> Self {
        AtsAnalysis {
            overall_score: Number::from(0),
            formatting_score: Number::from(0),
            keyword_score: Number::from(0),
            structure_score: Number::from(0),
            content_score: Number::from(0),
            issues: vec![AnalysisIssue {
                title: "Analysis Failure".to_string(),
                description: "The analyzer did not return a readable result.".to_string(),
                severity: Severity::Warning,
            }],
            recommended_keywords: vec![],
            suggestions: vec!["Please try running the analysis again.".to_string()],
        }
    }
}

/// Parses model output into an `AtsAnalysis`. Never errors: anything that
/// fails schema validation becomes the failure fallback.
pub fn parse_analysis(text: &str) -> AtsAnalysis {
    match serde_json::from_str(strip_json_fences(text)) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("analysis output did not match schema: {e}");
            AtsAnalysis::failure_fallback()
        }
    }
}

/// Strips a ```json ... ``` or ``` ... ``` fence the model sometimes wraps
/// JSON in, even with an enforced response mime type.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
