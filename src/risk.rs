//! Deterministic polypharmacy risk scoring.
//!
//! The score is a sum of bracketed contributions from age, kidney and
//! liver function, medication count, and matched drug interactions,
//! clamped to 0..=10. Every run over the same profile and interaction
//! table produces the same number.

use serde::Serialize;

use crate::interactions::{InteractionLookup, InteractionRecord, PairOutcome};
use crate::models::patient::PatientProfile;

/// Matched interactions can contribute at most this much.
pub const INTERACTION_CAP: f64 = 4.0;
/// Upper bound of the composite score.
pub const MAX_SCORE: f64 = 10.0;

/// Risk band derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    /// Bands: score above 6 is High, above 3 is Moderate, otherwise Low.
    /// Boundary values fall into the lower band.
    pub fn from_score(score: f64) -> Self {
        if score > 6.0 {
            RiskCategory::High
        } else if score > 3.0 {
            RiskCategory::Moderate
        } else {
            RiskCategory::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
        }
    }
}

/// Free-text organ function labels collapsed to four grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganFunction {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl OrganFunction {
    /// Unrecognized or empty labels read as Normal.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "mild" => OrganFunction::Mild,
            "moderate" => OrganFunction::Moderate,
            "severe" => OrganFunction::Severe,
            _ => OrganFunction::Normal,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            OrganFunction::Normal => 0.0,
            OrganFunction::Mild => 0.5,
            OrganFunction::Moderate => 1.0,
            OrganFunction::Severe => 2.0,
        }
    }
}

pub fn age_contribution(age: u32) -> f64 {
    match age {
        0..=59 => 0.0,
        60..=69 => 0.5,
        70..=79 => 1.0,
        _ => 1.5,
    }
}

pub fn organ_contribution(label: &str) -> f64 {
    OrganFunction::parse(label).weight()
}

pub fn polypharmacy_contribution(count: usize) -> f64 {
    match count {
        0..=1 => 0.0,
        2..=3 => 0.5,
        4..=5 => 1.0,
        6..=7 => 1.5,
        _ => 2.0,
    }
}

/// Sum matched record weights, capped at [`INTERACTION_CAP`].
pub fn interaction_contribution(records: &[InteractionRecord]) -> f64 {
    let raw: f64 = records.iter().map(|r| r.severity.weight()).sum();
    raw.min(INTERACTION_CAP)
}

/// Per-factor contributions that sum to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub age: f64,
    pub kidney: f64,
    pub liver: f64,
    pub polypharmacy: f64,
    pub interactions: f64,
    pub total: f64,
}

/// One matched interaction, reported with the medication names the
/// caller sent rather than table ids.
#[derive(Debug, Clone)]
pub struct PairFinding {
    pub drug_a: String,
    pub drug_b: String,
    pub record: InteractionRecord,
}

/// How much of the pairwise join actually reached the interaction table.
#[derive(Debug, Clone, Serialize)]
pub struct JoinCoverage {
    pub pairs_checked: usize,
    pub pairs_mapped: usize,
    pub pairs_unmapped: usize,
    pub unmapped_pairs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub score: f64,
    pub category: RiskCategory,
    pub breakdown: ScoreBreakdown,
    pub findings: Vec<PairFinding>,
    pub coverage: JoinCoverage,
}

/// Score a patient profile against an interaction table.
///
/// Every unordered medication pair is looked up once. Pairs whose ids
/// do not transform into the table's id space are reported in the
/// coverage block instead of being silently dropped.
pub fn assess(patient: &PatientProfile, lookup: &dyn InteractionLookup) -> RiskAssessment {
    let mut findings = Vec::new();
    let mut matched = Vec::new();
    let mut coverage = JoinCoverage {
        pairs_checked: 0,
        pairs_mapped: 0,
        pairs_unmapped: 0,
        unmapped_pairs: Vec::new(),
    };

    let meds = &patient.medications;
    for i in 0..meds.len() {
        for j in (i + 1)..meds.len() {
            coverage.pairs_checked += 1;
            match lookup.pair(&meds[i].id, &meds[j].id) {
                PairOutcome::Unmapped => {
                    coverage.pairs_unmapped += 1;
                    coverage
                        .unmapped_pairs
                        .push((meds[i].name.clone(), meds[j].name.clone()));
                }
                PairOutcome::Mapped(records) => {
                    coverage.pairs_mapped += 1;
                    for record in records {
                        matched.push(record.clone());
                        findings.push(PairFinding {
                            drug_a: meds[i].name.clone(),
                            drug_b: meds[j].name.clone(),
                            record,
                        });
                    }
                }
            }
        }
    }

    let age = age_contribution(patient.age);
    let kidney = organ_contribution(&patient.kidney_function);
    let liver = organ_contribution(&patient.liver_function);
    let polypharmacy = polypharmacy_contribution(meds.len());
    let interactions = interaction_contribution(&matched);

    let total = (age + kidney + liver + polypharmacy + interactions).clamp(0.0, MAX_SCORE);
    let breakdown = ScoreBreakdown {
        age,
        kidney,
        liver,
        polypharmacy,
        interactions,
        total,
    };

    RiskAssessment {
        score: total,
        category: RiskCategory::from_score(total),
        breakdown,
        findings,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactions::{MockInteractionLookup, Severity};
    use crate::models::patient::MedicationEntry;
    use test_case::test_case;

    fn med(id: &str, name: &str) -> MedicationEntry {
        MedicationEntry {
            id: id.to_string(),
            name: name.to_string(),
            dosage: String::new(),
            frequency: String::new(),
            category: "Unknown".to_string(),
        }
    }

    fn patient(age: u32, kidney: &str, liver: &str, meds: Vec<MedicationEntry>) -> PatientProfile {
        PatientProfile {
            name: "Test Patient".to_string(),
            age,
            gender: "female".to_string(),
            kidney_function: kidney.to_string(),
            liver_function: liver.to_string(),
            medications: meds,
        }
    }

    fn record(severity: Severity) -> InteractionRecord {
        InteractionRecord {
            drug_a: "CID000000001".to_string(),
            drug_b: "CID000000002".to_string(),
            side_effect: "bleeding".to_string(),
            severity,
            interaction_type: "pharmacodynamic".to_string(),
            severity_score: 4,
        }
    }

    #[test_case(0, 0.0; "newborn")]
    #[test_case(59, 0.0; "fifty nine")]
    #[test_case(60, 0.5; "sixty")]
    #[test_case(69, 0.5; "sixty nine")]
    #[test_case(70, 1.0; "seventy")]
    #[test_case(79, 1.0; "seventy nine")]
    #[test_case(80, 1.5; "eighty")]
    #[test_case(150, 1.5; "one fifty")]
    fn age_brackets(age: u32, expected: f64) {
        assert_eq!(age_contribution(age), expected);
    }

    #[test_case("normal", 0.0)]
    #[test_case("Mild", 0.5)]
    #[test_case("  MODERATE  ", 1.0)]
    #[test_case("severe", 2.0)]
    #[test_case("unknown label", 0.0)]
    #[test_case("", 0.0)]
    fn organ_labels(label: &str, expected: f64) {
        assert_eq!(organ_contribution(label), expected);
    }

    #[test_case(0, 0.0)]
    #[test_case(1, 0.0)]
    #[test_case(2, 0.5)]
    #[test_case(3, 0.5)]
    #[test_case(4, 1.0)]
    #[test_case(5, 1.0)]
    #[test_case(6, 1.5)]
    #[test_case(7, 1.5)]
    #[test_case(8, 2.0)]
    #[test_case(40, 2.0)]
    fn polypharmacy_steps(count: usize, expected: f64) {
        assert_eq!(polypharmacy_contribution(count), expected);
    }

    #[test]
    fn contributions_never_decrease_with_age() {
        let mut last = 0.0;
        for age in 0..=120 {
            let c = age_contribution(age);
            assert!(c >= last, "age {} dropped from {} to {}", age, last, c);
            last = c;
        }
    }

    #[test]
    fn adding_medications_never_lowers_the_contribution() {
        let mut last = 0.0;
        for count in 0..=40 {
            let c = polypharmacy_contribution(count);
            assert!(c >= last, "count {} dropped from {} to {}", count, last, c);
            last = c;
        }
    }

    #[test]
    fn interaction_weights_cap_at_four() {
        let records = vec![record(Severity::Severe); 5];
        assert_eq!(interaction_contribution(&records), INTERACTION_CAP);
    }

    #[test]
    fn worked_example_lands_just_inside_low() {
        // 72 years (1.0) + moderate kidney (1.0) + normal liver (0.0)
        // + five medications (1.0) + no interactions = 3.0, which is Low.
        let meds = (0..5).map(|i| med(&format!("DB0000{}", i + 1), "Drug")).collect();
        let p = patient(72, "moderate", "normal", meds);

        let mut lookup = MockInteractionLookup::new();
        lookup
            .expect_pair()
            .returning(|_, _| PairOutcome::Mapped(Vec::new()));

        let assessment = assess(&p, &lookup);
        assert_eq!(assessment.score, 3.0);
        assert_eq!(assessment.category, RiskCategory::Low);
        assert_eq!(assessment.breakdown.age, 1.0);
        assert_eq!(assessment.breakdown.kidney, 1.0);
        assert_eq!(assessment.breakdown.liver, 0.0);
        assert_eq!(assessment.breakdown.polypharmacy, 1.0);
        assert_eq!(assessment.breakdown.interactions, 0.0);
    }

    #[test]
    fn score_clamps_at_ten() {
        let meds = (0..50).map(|i| med(&format!("DB{:0>5}", i), "Drug")).collect();
        let p = patient(150, "severe", "severe", meds);

        let mut lookup = MockInteractionLookup::new();
        lookup
            .expect_pair()
            .returning(|_, _| PairOutcome::Mapped(vec![record(Severity::Severe)]));

        let assessment = assess(&p, &lookup);
        assert_eq!(assessment.score, MAX_SCORE);
        assert_eq!(assessment.category, RiskCategory::High);
    }

    #[test_case(0.0, RiskCategory::Low)]
    #[test_case(3.0, RiskCategory::Low; "three is still low")]
    #[test_case(3.5, RiskCategory::Moderate)]
    #[test_case(6.0, RiskCategory::Moderate; "six is still moderate")]
    #[test_case(6.5, RiskCategory::High)]
    #[test_case(10.0, RiskCategory::High)]
    fn category_bands(score: f64, expected: RiskCategory) {
        assert_eq!(RiskCategory::from_score(score), expected);
    }

    #[test]
    fn unmapped_pairs_surface_in_coverage() {
        let p = patient(
            50,
            "normal",
            "normal",
            vec![med("DB00001", "Warfarin"), med("ASP-99", "Aspirin")],
        );

        let table = crate::interactions::InteractionTable::from_records(vec![]);
        let assessment = assess(&p, &table);
        assert_eq!(assessment.coverage.pairs_checked, 1);
        assert_eq!(assessment.coverage.pairs_unmapped, 1);
        assert_eq!(
            assessment.coverage.unmapped_pairs,
            vec![("Warfarin".to_string(), "Aspirin".to_string())]
        );
    }

    #[test]
    fn no_medications_checks_no_pairs() {
        let p = patient(85, "severe", "mild", vec![]);
        let lookup = MockInteractionLookup::new();
        let assessment = assess(&p, &lookup);
        assert_eq!(assessment.coverage.pairs_checked, 0);
        // 1.5 age + 2.0 kidney + 0.5 liver, no meds.
        assert_eq!(assessment.score, 4.0);
        assert_eq!(assessment.category, RiskCategory::Moderate);
    }

    #[test]
    fn findings_carry_medication_names() {
        let p = patient(
            70,
            "normal",
            "normal",
            vec![med("DB00001", "Warfarin"), med("DB00002", "Aspirin")],
        );

        let mut lookup = MockInteractionLookup::new();
        lookup
            .expect_pair()
            .returning(|_, _| PairOutcome::Mapped(vec![record(Severity::Severe)]));

        let assessment = assess(&p, &lookup);
        assert_eq!(assessment.findings.len(), 1);
        assert_eq!(assessment.findings[0].drug_a, "Warfarin");
        assert_eq!(assessment.findings[0].drug_b, "Aspirin");
        assert_eq!(assessment.breakdown.interactions, 2.0);
    }
}
