//! System prompt templates, one per action. Immutable statics — never
//! mutated at runtime.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::Action;

pub const CHAT_SYSTEM: &str = "You are CareerForge AI, an expert career coach and resume advisor. You help users with:
- Resume writing and optimization
- Career advice and job search strategies
- Interview preparation
- Skill development recommendations
- Industry insights
Be concise, actionable, and encouraging. Use markdown formatting.";

pub const ANALYZE_SYSTEM: &str = "You are an expert ATS (Applicant Tracking System) resume analyzer. Analyze the provided resume and return a JSON response matching the enforced response schema. Evaluate:
- Overall ATS compatibility score (0-100)
- Formatting score, keyword score, structure score, content score (each 0-100)
- List of specific issues found with severity (critical/warning/info)
- Recommended keywords to add
- Actionable improvement suggestions
Be thorough and specific.";

pub const ENHANCE_SYSTEM: &str = "You are an expert resume writer. Given a resume bullet point or section, rewrite it to be more impactful, using action verbs, quantifiable achievements, and ATS-friendly language. Return 3 enhanced versions.";

pub const COVER_LETTER_SYSTEM: &str = "You are an expert cover letter writer. Given a resume summary and job details, write a compelling, personalized cover letter. Be professional, specific, and highlight relevant experience. Use a warm but professional tone. Format with proper paragraphs.";

/// Selects the system instruction for an action. Unknown wire tags already
/// collapsed to `Chat` at parse time, so this mapping is total.
pub fn system_prompt(action: Action) -> &'static str {
    match action {
        Action::Chat => CHAT_SYSTEM,
        Action::Analyze => ANALYZE_SYSTEM,
        Action::Enhance => ENHANCE_SYSTEM,
        Action::CoverLetter => COVER_LETTER_SYSTEM,
    }
}

/// Response schema attached to analyze requests so the upstream is forced to
/// emit parseable JSON matching `AtsAnalysis`. Built once at first use.
pub static ANALYSIS_RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "overall_score": { "type": "NUMBER", "description": "Overall ATS score 0-100" },
            "formatting_score": { "type": "NUMBER" },
            "keyword_score": { "type": "NUMBER" },
            "structure_score": { "type": "NUMBER" },
            "content_score": { "type": "NUMBER" },
            "issues": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "severity": { "type": "STRING", "enum": ["critical", "warning", "info"] }
                    },
                    "required": ["title", "description", "severity"]
                }
            },
            "recommended_keywords": { "type": "ARRAY", "items": { "type": "STRING" } },
            "suggestions": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "overall_score", "formatting_score", "keyword_score", "structure_score",
            "content_score", "issues", "recommended_keywords", "suggestions"
        ]
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_action_has_a_distinct_template() {
        let prompts = [
            system_prompt(Action::Chat),
            system_prompt(Action::Analyze),
            system_prompt(Action::Enhance),
            system_prompt(Action::CoverLetter),
        ];
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_unknown_tag_resolves_to_chat_template() {
        let action = Action::from_tag("no-such-action");
        assert_eq!(system_prompt(action), CHAT_SYSTEM);
    }

    #[test]
    fn test_analysis_schema_requires_every_contract_field() {
        let schema: &Value = &ANALYSIS_RESPONSE_SCHEMA;
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 8);
        for field in [
            "overall_score",
            "issues",
            "recommended_keywords",
            "suggestions",
        ] {
            assert!(
                required.iter().any(|v| v.as_str() == Some(field)),
                "missing {field}"
            );
        }
    }
}
