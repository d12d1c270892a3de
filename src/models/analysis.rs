//! Response shapes for the analysis endpoint.

use serde::Serialize;
use serde_json::Value;

use crate::ai::AnalysisOutcome;
use crate::extract::{PatientExtraction, RealTimeAnalysis};
use crate::interactions::Severity;
use crate::risk::{JoinCoverage, PairFinding, RiskAssessment, RiskCategory, ScoreBreakdown};

/// The deterministic part of the result: always present, model or not.
#[derive(Debug, Clone, Serialize)]
pub struct BaseScore {
    pub score: f64,
    pub category: RiskCategory,
    pub breakdown: ScoreBreakdown,
}

impl From<&RiskAssessment> for BaseScore {
    fn from(assessment: &RiskAssessment) -> Self {
        Self {
            score: assessment.score,
            category: assessment.category,
            breakdown: assessment.breakdown.clone(),
        }
    }
}

/// One matched interaction on the wire, keyed by medication names.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionFinding {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub side_effect: String,
    pub interaction_type: String,
}

impl From<&PairFinding> for InteractionFinding {
    fn from(finding: &PairFinding) -> Self {
        Self {
            drug_a: finding.drug_a.clone(),
            drug_b: finding.drug_b.clone(),
            severity: finding.record.severity,
            side_effect: finding.record.side_effect.clone(),
            interaction_type: finding.record.interaction_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    #[serde(flatten)]
    pub data: PatientExtraction,
    pub confidence: u32,
    pub real_time: RealTimeAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub base: BaseScore,
    pub extraction: ExtractionReport,
    pub interactions: Vec<InteractionFinding>,
    pub coverage: JoinCoverage,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
}

impl AnalyzeResponse {
    pub fn assemble(
        assessment: &RiskAssessment,
        extraction: ExtractionReport,
        outcome: AnalysisOutcome,
    ) -> Self {
        Self {
            success: true,
            base: BaseScore::from(assessment),
            extraction,
            interactions: assessment.findings.iter().map(Into::into).collect(),
            coverage: assessment.coverage.clone(),
            outcome,
        }
    }
}

/// Convenience view of the model report, used when a handler needs to
/// peek at a field without committing to the full schema.
pub fn report_field<'a>(analysis: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = analysis;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}
