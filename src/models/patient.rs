use serde::{Deserialize, Serialize};
use validator::Validate;

/// Patient profile as submitted by the client form.
///
/// Organ-function fields are free-form ordinal labels ("normal", "mild",
/// "moderate", "severe"). Unrecognized labels are accepted and simply
/// contribute nothing to the risk score.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default)]
    #[validate(length(max = 200, message = "name is too long"))]
    pub name: String,
    #[serde(default)]
    #[validate(range(max = 150, message = "age is out of range"))]
    pub age: u32,
    #[serde(default)]
    pub gender: String, // e.g., "female", "male", free-form
    #[serde(default)]
    pub kidney_function: String,
    #[serde(default)]
    pub liver_function: String,
    #[serde(default)]
    #[validate]
    pub medications: Vec<MedicationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEntry {
    #[serde(default)]
    pub id: String, // catalog id, e.g. "DB00001"
    #[validate(length(min = 1, message = "medication name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub dosage: String, // free string, e.g. "10mg"
    #[serde(default)]
    pub frequency: String, // free string, e.g. "Once daily"
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_form_payload() {
        let payload = r#"{
            "name": "Margaret Jones",
            "age": 78,
            "gender": "female",
            "kidneyFunction": "moderate",
            "liverFunction": "normal",
            "medications": [
                {"id": "DB00001", "name": "Warfarin", "dosage": "5mg", "frequency": "Once daily"}
            ]
        }"#;
        let profile: PatientProfile = serde_json::from_str(payload).unwrap();
        assert_eq!(profile.kidney_function, "moderate");
        assert_eq!(profile.medications.len(), 1);
        assert_eq!(profile.medications[0].category, "Unknown");
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn missing_optional_fields_default() {
        let profile: PatientProfile = serde_json::from_str(r#"{"age": 70}"#).unwrap();
        assert_eq!(profile.name, "");
        assert_eq!(profile.kidney_function, "");
        assert!(profile.medications.is_empty());
    }

    #[test]
    fn rejects_out_of_range_age() {
        let profile: PatientProfile =
            serde_json::from_str(r#"{"age": 200, "name": "x"}"#).unwrap();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn rejects_unnamed_medication() {
        let payload = r#"{"age": 70, "medications": [{"id": "DB00001", "name": ""}]}"#;
        let profile: PatientProfile = serde_json::from_str(payload).unwrap();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn round_trips_to_camel_case() {
        let profile: PatientProfile =
            serde_json::from_str(r#"{"age": 70, "kidneyFunction": "mild"}"#).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["kidneyFunction"], "mild");
        assert!(json.get("kidney_function").is_none());
    }
}
