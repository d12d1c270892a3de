//! Structured extraction and lightweight bedside analysis of a patient
//! profile. This runs before any model call and never fails; missing
//! fields simply lower the confidence score.

use chrono::Utc;
use serde::Serialize;

use crate::catalog::DrugCatalog;
use crate::models::patient::{MedicationEntry, PatientProfile};
use crate::risk::OrganFunction;

/// Medication count at which the profile counts as polypharmacy.
pub const POLYPHARMACY_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientExtraction {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub kidney_function: String,
    pub liver_function: String,
    pub medication_count: usize,
    pub medications: Vec<MedicationEntry>,
    pub polypharmacy_risk: bool,
    pub risk_factors: Vec<String>,
    pub clinical_notes: String,
    pub extracted_at: String,
}

/// Build the extraction summary for a profile, folding in the catalog's
/// elderly risk annotations for each recognized medication.
pub fn extract(patient: &PatientProfile, catalog: &DrugCatalog) -> PatientExtraction {
    let mut risk_factors = Vec::new();

    if patient.age >= 65 {
        risk_factors.push("Advanced age (65+)".to_string());
    }
    if patient.age >= 75 {
        risk_factors.push("Very advanced age (75+)".to_string());
    }

    let kidney = OrganFunction::parse(&patient.kidney_function);
    if kidney != OrganFunction::Normal {
        risk_factors.push(format!(
            "Kidney impairment ({})",
            patient.kidney_function.trim().to_lowercase()
        ));
    }
    let liver = OrganFunction::parse(&patient.liver_function);
    if liver != OrganFunction::Normal {
        risk_factors.push(format!(
            "Liver impairment ({})",
            patient.liver_function.trim().to_lowercase()
        ));
    }

    let polypharmacy_risk = patient.medications.len() >= POLYPHARMACY_THRESHOLD;
    if polypharmacy_risk {
        risk_factors.push("Polypharmacy (5+ medications)".to_string());
    }

    for med in &patient.medications {
        let entry = catalog
            .get(&med.id)
            .or_else(|| catalog.get_by_name(&med.name));
        if let Some(entry) = entry {
            for factor in &entry.elderly_risk_factors {
                let line = format!("{}: {}", entry.name, factor);
                if !risk_factors.contains(&line) {
                    risk_factors.push(line);
                }
            }
        }
    }

    let clinical_notes = compose_notes(patient, polypharmacy_risk, risk_factors.len());

    PatientExtraction {
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender.clone(),
        kidney_function: patient.kidney_function.clone(),
        liver_function: patient.liver_function.clone(),
        medication_count: patient.medications.len(),
        medications: patient.medications.clone(),
        polypharmacy_risk,
        risk_factors,
        clinical_notes,
        extracted_at: Utc::now().to_rfc3339(),
    }
}

fn compose_notes(patient: &PatientProfile, polypharmacy: bool, factor_count: usize) -> String {
    let mut notes = format!(
        "Patient is taking {} medication(s).",
        patient.medications.len()
    );
    if polypharmacy {
        notes.push_str(" Medication count meets the polypharmacy threshold; a structured review is recommended.");
    }
    if factor_count > 0 {
        notes.push_str(&format!(
            " {} risk factor(s) identified for this profile.",
            factor_count
        ));
    } else {
        notes.push_str(" No elevated risk factors identified.");
    }
    notes
}

/// How completely the profile was filled in, 0 to 100.
///
/// Weights: name 20, age 20, gender 10, kidney function 15, liver
/// function 15, at least one medication 20.
pub fn confidence_score(patient: &PatientProfile) -> u32 {
    let mut score = 0u32;
    if !patient.name.trim().is_empty() {
        score += 20;
    }
    if patient.age > 0 {
        score += 20;
    }
    if !patient.gender.trim().is_empty() {
        score += 10;
    }
    if !patient.kidney_function.trim().is_empty() {
        score += 15;
    }
    if !patient.liver_function.trim().is_empty() {
        score += 15;
    }
    if !patient.medications.is_empty() {
        score += 20;
    }
    score.min(100)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeAnalysis {
    pub risk_indicators: Vec<String>,
    pub clinical_alerts: Vec<String>,
    pub monitoring_suggestions: Vec<String>,
}

/// Immediate indicators, alerts, and monitoring suggestions derived
/// from the profile alone, without the interaction table.
pub fn realtime_analysis(patient: &PatientProfile) -> RealTimeAnalysis {
    let mut risk_indicators = Vec::new();
    let mut clinical_alerts = Vec::new();
    let mut monitoring_suggestions = Vec::new();

    let med_count = patient.medications.len();
    if med_count >= POLYPHARMACY_THRESHOLD {
        risk_indicators.push(format!(
            "Polypharmacy: {} concurrent medications",
            med_count
        ));
    }
    if patient.age >= 65 {
        risk_indicators.push(format!("Elderly patient ({} years)", patient.age));
    }

    if OrganFunction::parse(&patient.kidney_function) != OrganFunction::Normal && med_count > 0 {
        clinical_alerts.push(
            "Impaired kidney function with active medications; review renal dosing".to_string(),
        );
    }
    if OrganFunction::parse(&patient.liver_function) != OrganFunction::Normal && med_count > 0 {
        clinical_alerts.push(
            "Impaired liver function with active medications; review hepatic metabolism"
                .to_string(),
        );
    }
    if med_count >= 8 {
        clinical_alerts.push(format!(
            "High medication burden ({} medications); deprescribing review advised",
            med_count
        ));
    }

    for med in &patient.medications {
        let name = med.name.trim().to_lowercase();
        let suggestion = match name.as_str() {
            "warfarin" | "heparin" | "rivaroxaban" | "apixaban" => {
                Some("Monitor INR and watch for signs of bleeding")
            }
            "metformin" | "insulin" | "glipizide" => Some("Monitor blood glucose regularly"),
            "furosemide" | "hydrochlorothiazide" | "spironolactone" => {
                Some("Monitor electrolytes and renal function")
            }
            "digoxin" => Some("Monitor digoxin level and heart rate"),
            "atorvastatin" | "simvastatin" | "rosuvastatin" => {
                Some("Monitor liver panel periodically")
            }
            _ => None,
        };
        if let Some(suggestion) = suggestion {
            let line = suggestion.to_string();
            if !monitoring_suggestions.contains(&line) {
                monitoring_suggestions.push(line);
            }
        }
    }
    if monitoring_suggestions.is_empty() && patient.age >= 65 {
        monitoring_suggestions.push("Routine vitals and medication adherence check".to_string());
    }

    RealTimeAnalysis {
        risk_indicators,
        clinical_alerts,
        monitoring_suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogOptions;

    fn med(id: &str, name: &str) -> MedicationEntry {
        MedicationEntry {
            id: id.to_string(),
            name: name.to_string(),
            dosage: "10mg".to_string(),
            frequency: "daily".to_string(),
            category: "Unknown".to_string(),
        }
    }

    fn profile(age: u32, kidney: &str, liver: &str, meds: Vec<MedicationEntry>) -> PatientProfile {
        PatientProfile {
            name: "Ada".to_string(),
            age,
            gender: "female".to_string(),
            kidney_function: kidney.to_string(),
            liver_function: liver.to_string(),
            medications: meds,
        }
    }

    #[test]
    fn flags_age_organ_and_polypharmacy_factors() {
        let meds = (0..5).map(|i| med(&format!("X{}", i), "Drug")).collect();
        let p = profile(78, "Moderate", "mild", meds);
        let extraction = extract(&p, &DrugCatalog::seed(CatalogOptions::default()));

        assert!(extraction.polypharmacy_risk);
        assert!(extraction
            .risk_factors
            .contains(&"Advanced age (65+)".to_string()));
        assert!(extraction
            .risk_factors
            .contains(&"Very advanced age (75+)".to_string()));
        assert!(extraction
            .risk_factors
            .contains(&"Kidney impairment (moderate)".to_string()));
        assert!(extraction
            .risk_factors
            .contains(&"Liver impairment (mild)".to_string()));
        assert!(extraction
            .risk_factors
            .contains(&"Polypharmacy (5+ medications)".to_string()));
    }

    #[test]
    fn young_healthy_profile_has_no_factors() {
        let p = profile(40, "normal", "normal", vec![med("X1", "Drug")]);
        let extraction = extract(&p, &DrugCatalog::seed(CatalogOptions::default()));
        assert!(extraction.risk_factors.is_empty());
        assert!(!extraction.polypharmacy_risk);
        assert!(extraction.clinical_notes.contains("No elevated risk factors"));
    }

    #[test]
    fn catalog_annotations_attach_to_recognized_medications() {
        let p = profile(50, "normal", "normal", vec![med("DB00001", "Warfarin")]);
        let extraction = extract(&p, &DrugCatalog::seed(CatalogOptions::default()));
        assert!(extraction
            .risk_factors
            .iter()
            .any(|f| f.starts_with("Warfarin: ")));
    }

    #[test]
    fn catalog_lookup_falls_back_to_name() {
        // Unknown id, known name.
        let p = profile(50, "normal", "normal", vec![med("local-1", "Digoxin")]);
        let extraction = extract(&p, &DrugCatalog::seed(CatalogOptions::default()));
        assert!(extraction
            .risk_factors
            .iter()
            .any(|f| f.starts_with("Digoxin: ")));
    }

    #[test]
    fn confidence_rewards_complete_profiles() {
        let full = profile(70, "normal", "normal", vec![med("X1", "Drug")]);
        assert_eq!(confidence_score(&full), 100);

        let sparse = PatientProfile {
            name: String::new(),
            age: 0,
            gender: String::new(),
            kidney_function: "normal".to_string(),
            liver_function: String::new(),
            medications: vec![],
        };
        assert_eq!(confidence_score(&sparse), 15);
    }

    #[test]
    fn realtime_alerts_need_active_medications() {
        let without_meds = profile(70, "severe", "severe", vec![]);
        let analysis = realtime_analysis(&without_meds);
        assert!(analysis.clinical_alerts.is_empty());

        let with_meds = profile(70, "severe", "normal", vec![med("X1", "Drug")]);
        let analysis = realtime_analysis(&with_meds);
        assert_eq!(analysis.clinical_alerts.len(), 1);
        assert!(analysis.clinical_alerts[0].contains("kidney"));
    }

    #[test]
    fn monitoring_matches_known_drug_names() {
        let meds = vec![
            med("X1", "Warfarin"),
            med("X2", "warfarin"), // duplicate suggestion collapses
            med("X3", "Metformin"),
            med("X4", "Chalk"),
        ];
        let analysis = realtime_analysis(&profile(55, "normal", "normal", meds));
        assert_eq!(
            analysis.monitoring_suggestions,
            vec![
                "Monitor INR and watch for signs of bleeding".to_string(),
                "Monitor blood glucose regularly".to_string(),
            ]
        );
    }

    #[test]
    fn elderly_default_monitoring_when_nothing_matches() {
        let analysis = realtime_analysis(&profile(80, "normal", "normal", vec![med("X1", "Chalk")]));
        assert_eq!(
            analysis.monitoring_suggestions,
            vec!["Routine vitals and medication adherence check".to_string()]
        );
    }

    #[test]
    fn high_burden_alert_at_eight_medications() {
        let meds = (0..8).map(|i| med(&format!("X{}", i), "Drug")).collect();
        let analysis = realtime_analysis(&profile(50, "normal", "normal", meds));
        assert!(analysis
            .clinical_alerts
            .iter()
            .any(|a| a.contains("High medication burden")));
    }
}
