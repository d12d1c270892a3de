//! Dashboard analytics snapshot.
//!
//! Model accuracy figures, chart series, and recent reports are fixed
//! reference values; the live counters are sampled per request so the
//! dashboard visibly refreshes.

use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModelAccuracy {
    pub model_accuracy: f64,
    pub risk_level_accuracy: f64,
    pub drug_interaction_accuracy: f64,
    pub side_effect_accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveMetrics {
    pub total_analyses: u32,
    pub high_risk_patients: u32,
    pub this_month: u32,
    pub avg_risk_score: String, // e.g., "5.3"
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskSlice {
    pub name: String,
    pub value: u32,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeGroupRow {
    pub age_group: String,
    pub count: u32,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrendRow {
    pub month: String,
    pub analyses: u32,
    pub high_risk: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Charts {
    pub risk_distribution: Vec<RiskSlice>,
    pub age_groups: Vec<AgeGroupRow>,
    pub monthly_trends: Vec<MonthlyTrendRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentReport {
    pub id: String,
    pub patient_name: String,
    pub age: u32,
    pub risk_score: f64,
    pub risk_level: String,
    pub interactions: u32,
    pub medications: u32,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub model_accuracy: ModelAccuracy,
    pub live_metrics: LiveMetrics,
    pub charts: Charts,
    pub recent_reports: Vec<RecentReport>,
}

fn slice(name: &str, value: u32, color: &str) -> RiskSlice {
    RiskSlice {
        name: name.to_string(),
        value,
        color: color.to_string(),
    }
}

fn trend(month: &str, analyses: u32, high_risk: u32) -> MonthlyTrendRow {
    MonthlyTrendRow {
        month: month.to_string(),
        analyses,
        high_risk,
    }
}

/// Build one snapshot. Only the live counters vary between calls.
pub fn snapshot() -> AnalyticsSnapshot {
    let mut rng = rand::thread_rng();

    AnalyticsSnapshot {
        model_accuracy: ModelAccuracy {
            model_accuracy: 92.5,
            risk_level_accuracy: 89.3,
            drug_interaction_accuracy: 94.1,
            side_effect_accuracy: 87.8,
        },
        live_metrics: LiveMetrics {
            total_analyses: rng.gen_range(500..1500),
            high_risk_patients: rng.gen_range(50..150),
            this_month: rng.gen_range(100..300),
            avg_risk_score: format!("{:.1}", rng.gen::<f64>() * 3.0 + 4.0),
        },
        charts: Charts {
            risk_distribution: vec![
                slice("Low Risk", 45, "#10B981"),
                slice("Moderate Risk", 35, "#F59E0B"),
                slice("High Risk", 20, "#EF4444"),
            ],
            age_groups: vec![
                AgeGroupRow {
                    age_group: "60-70".to_string(),
                    count: 120,
                    risk_score: 3.2,
                },
                AgeGroupRow {
                    age_group: "70-80".to_string(),
                    count: 95,
                    risk_score: 5.8,
                },
                AgeGroupRow {
                    age_group: "80+".to_string(),
                    count: 65,
                    risk_score: 7.4,
                },
            ],
            monthly_trends: vec![
                trend("Jan", 45, 8),
                trend("Feb", 52, 12),
                trend("Mar", 48, 9),
                trend("Apr", 61, 15),
                trend("May", 58, 13),
                trend("Jun", 67, 18),
            ],
        },
        recent_reports: vec![
            RecentReport {
                id: "1".to_string(),
                patient_name: "John Doe".to_string(),
                age: 72,
                risk_score: 6.8,
                risk_level: "High".to_string(),
                interactions: 3,
                medications: 5,
                date: "2024-01-15".to_string(),
                status: "Completed".to_string(),
            },
            RecentReport {
                id: "2".to_string(),
                patient_name: "Jane Smith".to_string(),
                age: 68,
                risk_score: 4.2,
                risk_level: "Moderate".to_string(),
                interactions: 1,
                medications: 3,
                date: "2024-01-14".to_string(),
                status: "Completed".to_string(),
            },
        ],
    }
}
