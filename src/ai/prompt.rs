//! Prompt assembly for the analysis model call.

use crate::models::patient::PatientProfile;
use crate::risk::RiskAssessment;

const REPORT_SCHEMA: &str = r#"{
  "overview": "string",
  "patient_name": "string",
  "age": number,
  "base_risk_score": number,
  "risk_summary": {
    "overall_risk_score": number,
    "risk_level": "Low | Moderate | High",
    "scoring_breakdown": {
      "age_contribution": number,
      "kidney_contribution": number,
      "liver_contribution": number,
      "drug_interactions": number,
      "organ_effects": number,
      "polypharmacy": number
    },
    "notes": "string"
  },
  "drug_analysis": [
    {
      "name": "string",
      "category": "string",
      "interaction_risks": [
        {"drug": "string", "interaction": "string", "risk_score": number, "clinical_impact": "string"}
      ],
      "side_effects": [
        {"effect": "string", "severity": "Mild | Moderate | Severe", "frequency": "Common | Uncommon | Rare"}
      ],
      "organs_affected": [
        {"organ": "string", "effect": "string", "severity": "string"}
      ],
      "individual_risk_score": number,
      "risk_contribution": number
    }
  ],
  "drug_alternatives": [
    {
      "original_drug": "string",
      "alternatives": [
        {
          "alternative_name": "string",
          "advantages": ["string"],
          "disadvantages": ["string"],
          "dosing_recommendation": "string",
          "monitoring_parameters": ["string"],
          "risk_reduction": "string"
        }
      ]
    }
  ],
  "clinical_recommendations": ["string"],
  "confidence": number,
  "disclaimer": "string"
}"#;

/// Build the full analysis prompt: the patient profile, the
/// deterministic score with its breakdown, the interactions already
/// matched locally, and the exact JSON shape the reply must take.
pub fn build_analysis_prompt(patient: &PatientProfile, assessment: &RiskAssessment) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(
        "You are a clinical decision-support AI for polypharmacy risk assessment with access to up-to-date medical literature. ",
    );
    prompt.push_str(
        "Analyze this patient's data and medications for drug-drug interactions, organ toxicity, and overall risk.\n\n",
    );

    prompt.push_str("Patient Details:\n");
    prompt.push_str(&format!("- Name: {}\n", patient.name));
    prompt.push_str(&format!("- Age: {}\n", patient.age));
    prompt.push_str(&format!("- Gender: {}\n", patient.gender));
    prompt.push_str(&format!("- Kidney function: {}\n", patient.kidney_function));
    prompt.push_str(&format!("- Liver function: {}\n", patient.liver_function));
    prompt.push_str("- Medications:\n");
    for med in &patient.medications {
        prompt.push_str(&format!(
            "  - {} ({}, {}), category: {}\n",
            med.name, med.dosage, med.frequency, med.category
        ));
    }
    if patient.medications.is_empty() {
        prompt.push_str("  (none reported)\n");
    }

    prompt.push_str("\nBASE RISK SCORE CALCULATION (already computed, use as the baseline):\n");
    let b = &assessment.breakdown;
    prompt.push_str(&format!("- Age contribution: {:.1}\n", b.age));
    prompt.push_str(&format!("- Kidney function contribution: {:.1}\n", b.kidney));
    prompt.push_str(&format!("- Liver function contribution: {:.1}\n", b.liver));
    prompt.push_str(&format!("- Polypharmacy contribution: {:.1}\n", b.polypharmacy));
    prompt.push_str(&format!(
        "- Known drug interaction contribution: {:.1}\n",
        b.interactions
    ));
    prompt.push_str(&format!(
        "- Base risk score: {:.1} / 10.0 ({})\n",
        assessment.score,
        assessment.category.as_str()
    ));

    if !assessment.findings.is_empty() {
        prompt.push_str("\nInteractions already matched in the local reference table:\n");
        for finding in &assessment.findings {
            prompt.push_str(&format!(
                "- {} + {}: {} ({} severity, {})\n",
                finding.drug_a,
                finding.drug_b,
                finding.record.side_effect,
                finding.record.severity,
                finding.record.interaction_type
            ));
        }
    }

    prompt.push_str("\nFor each medication, evaluate:\n");
    prompt.push_str("1. Drug-drug interaction risks with the other listed medications\n");
    prompt.push_str("2. Side effects relevant to this patient\n");
    prompt.push_str("3. Organs affected, considering the stated kidney and liver function\n");
    prompt.push_str("4. Individual risk contribution to the overall score\n");

    prompt.push_str("\nADDITIONAL SCORING RULES:\n");
    prompt.push_str("- Add 1.0 if a kidney-affecting drug is present with impaired kidney function\n");
    prompt.push_str("- Add 1.0 if a liver-affecting drug is present with impaired liver function\n");
    prompt.push_str("- Add 0.5 for each interaction with a risk_score of 60 or more\n");
    prompt.push_str("- Add 1.0 for each interaction with a risk_score of 80 or more\n");
    prompt.push_str("- Add 1.0 if the patient takes 5 or more medications\n");

    prompt.push_str("\nOutput a structured JSON report with exactly this shape:\n");
    prompt.push_str(REPORT_SCHEMA);

    prompt.push_str("\n\nFINAL SCORING GUIDELINES:\n");
    prompt.push_str("- 0-3.0 = Low Risk\n");
    prompt.push_str("- 3.1-6.0 = Moderate Risk\n");
    prompt.push_str("- 6.1-10.0 = High Risk\n");

    prompt.push_str(
        "\nReturn ONLY the JSON report, with no surrounding prose and no markdown fences.\n",
    );

    prompt
}
