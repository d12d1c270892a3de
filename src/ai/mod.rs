//! Model-backed analysis: prompt construction, the Gemini HTTP client,
//! and reply parsing with a deterministic fallback.

pub mod client;
pub mod parse;
pub mod prompt;

pub use client::{AiError, GeminiClient};
pub use parse::parse_analysis_text;
pub use prompt::build_analysis_prompt;

use serde::Serialize;
use serde_json::Value;

use crate::risk::RiskCategory;

pub const FALLBACK_OVERVIEW: &str = "AI analysis completed successfully";
pub const FALLBACK_DISCLAIMER: &str = "Analysis completed with AI assistance";
pub const FALLBACK_CONFIDENCE: f64 = 0.8;

/// Minimal structured report used when the model reply is not parseable
/// JSON. Built entirely from the deterministic score so the response
/// shape stays stable for clients.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackAnalysis {
    pub overview: String,
    pub base_risk_score: f64,
    pub category: RiskCategory,
    pub confidence: f64,
    pub disclaimer: String,
}

impl FallbackAnalysis {
    pub fn from_score(score: f64) -> Self {
        Self {
            overview: FALLBACK_OVERVIEW.to_string(),
            base_risk_score: score,
            category: RiskCategory::from_score(score),
            confidence: FALLBACK_CONFIDENCE,
            disclaimer: FALLBACK_DISCLAIMER.to_string(),
        }
    }
}

/// What the analysis endpoint ends up returning: either the model's own
/// JSON report, or the fallback. The raw reply text is preserved either
/// way so nothing the model said is lost.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Model { analysis: Value, raw_text: String },
    Fallback {
        analysis: FallbackAnalysis,
        raw_text: String,
    },
}

impl AnalysisOutcome {
    pub fn from_reply(text: &str, base_score: f64) -> Self {
        match parse_analysis_text(text) {
            Some(analysis) => AnalysisOutcome::Model {
                analysis,
                raw_text: text.to_string(),
            },
            None => AnalysisOutcome::Fallback {
                analysis: FallbackAnalysis::from_score(base_score),
                raw_text: text.to_string(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_reply_becomes_model_outcome() {
        let outcome = AnalysisOutcome::from_reply(r#"{"risk_summary": {"overall_risk_score": 5}}"#, 4.5);
        assert!(!outcome.is_fallback());
        match outcome {
            AnalysisOutcome::Model { analysis, raw_text } => {
                assert!(analysis.get("risk_summary").is_some());
                assert!(raw_text.contains("overall_risk_score"));
            }
            AnalysisOutcome::Fallback { .. } => panic!("expected model outcome"),
        }
    }

    #[test]
    fn prose_reply_becomes_fallback_with_base_score() {
        let outcome = AnalysisOutcome::from_reply("The patient seems fine to me.", 3.5);
        assert!(outcome.is_fallback());
        match outcome {
            AnalysisOutcome::Fallback { analysis, raw_text } => {
                assert_eq!(analysis.base_risk_score, 3.5);
                assert_eq!(analysis.category, RiskCategory::Moderate);
                assert_eq!(analysis.overview, FALLBACK_OVERVIEW);
                assert_eq!(analysis.confidence, FALLBACK_CONFIDENCE);
                assert_eq!(raw_text, "The patient seems fine to me.");
            }
            AnalysisOutcome::Model { .. } => panic!("expected fallback outcome"),
        }
    }

    #[test]
    fn outcome_serializes_with_source_tag() {
        let outcome = AnalysisOutcome::from_reply("not json", 1.0);
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["analysis"]["category"], "Low");
    }
}
