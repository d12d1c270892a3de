use criterion::{black_box, criterion_group, criterion_main, Criterion};

use polyrisk::catalog::{CatalogOptions, DrugCatalog};
use polyrisk::interactions::{InteractionRecord, InteractionTable, Severity};
use polyrisk::models::patient::{MedicationEntry, PatientProfile};
use polyrisk::risk;

fn scoring_patient(med_count: usize) -> PatientProfile {
    let medications = (0..med_count)
        .map(|i| MedicationEntry {
            id: format!("DB{:0>5}", i + 1),
            name: format!("Drug {}", i + 1),
            dosage: "10mg".to_string(),
            frequency: "daily".to_string(),
            category: "Unknown".to_string(),
        })
        .collect();
    PatientProfile {
        name: "Benchmark Patient".to_string(),
        age: 78,
        gender: "female".to_string(),
        kidney_function: "moderate".to_string(),
        liver_function: "mild".to_string(),
        medications,
    }
}

fn interaction_table() -> InteractionTable {
    let records = (0..500)
        .map(|i| InteractionRecord {
            drug_a: format!("CID{:0>9}", i),
            drug_b: format!("CID{:0>9}", i + 1),
            side_effect: "effect".to_string(),
            severity: Severity::Moderate,
            interaction_type: "pharmacodynamic".to_string(),
            severity_score: 2,
        })
        .collect();
    InteractionTable::from_records(records)
}

fn bench_risk_assessment(c: &mut Criterion) {
    let table = interaction_table();
    let patient = scoring_patient(10);
    c.bench_function("assess 10 medications", |b| {
        b.iter(|| risk::assess(black_box(&patient), &table))
    });
}

fn bench_catalog_search(c: &mut Criterion) {
    let catalog = DrugCatalog::seed(CatalogOptions::default());
    c.bench_function("catalog substring search", |b| {
        b.iter(|| catalog.search(black_box("in"), None))
    });
}

criterion_group!(benches, bench_risk_assessment, bench_catalog_search);
criterion_main!(benches);
