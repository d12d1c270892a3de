//! Drug catalog: the searchable reference list of drug names.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::utils::split_csv_line;

/// One drug in the reference catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String, // e.g., "DB00001"
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub elderly_risk_factors: Vec<String>,
}

/// Where the catalog contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    File,
    Seed,
}

/// Tunable search behavior.
#[derive(Debug, Clone, Copy)]
pub struct CatalogOptions {
    /// Queries shorter than this return nothing.
    pub min_query_len: usize,
    /// Result cap when the caller does not supply one.
    pub default_limit: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            default_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_drugs: usize,
    pub with_descriptions: usize,
    pub source: CatalogSource,
    pub categories: HashMap<String, usize>,
}

/// In-memory drug catalog, built once at startup and read-only afterwards.
pub struct DrugCatalog {
    entries: Vec<CatalogEntry>,
    names_lower: Vec<String>,
    by_id: HashMap<String, usize>,
    by_name_lower: HashMap<String, usize>,
    source: CatalogSource,
    options: CatalogOptions,
}

impl DrugCatalog {
    /// Load the catalog from a comma-separated file.
    ///
    /// The file must carry a header row, then at least id and name columns.
    /// Optional columns: description, name length, description length,
    /// has-description flag, category, elderly-risk factors (JSON array).
    /// Malformed rows are skipped with a warning. A missing or empty file
    /// falls back to the built-in seed list so the service stays usable.
    pub fn load_from_file(path: &Path, options: CatalogOptions) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "could not read drug catalog {}: {}, using seed list",
                    path.display(),
                    err
                );
                return Self::seed(options);
            }
        };

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for (line_no, line) in raw.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let parts = split_csv_line(line);
            if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
                skipped += 1;
                if skipped <= 10 {
                    warn!("skipping malformed catalog row at line {}", line_no + 1);
                }
                continue;
            }
            entries.push(CatalogEntry {
                id: parts[0].clone(),
                name: parts[1].clone(),
                description: parts.get(2).cloned().unwrap_or_default(),
                category: parts
                    .get(6)
                    .filter(|c| !c.is_empty())
                    .cloned()
                    .unwrap_or_else(|| "other".to_string()),
                elderly_risk_factors: parts
                    .get(7)
                    .map(|raw| parse_risk_factors(raw))
                    .unwrap_or_default(),
            });
        }

        if entries.is_empty() {
            warn!(
                "drug catalog {} had no usable rows, using seed list",
                path.display()
            );
            return Self::seed(options);
        }

        info!(
            "loaded {} drugs from {} ({} rows skipped)",
            entries.len(),
            path.display(),
            skipped
        );
        Self::from_entries(entries, CatalogSource::File, options)
    }

    /// Build a catalog directly from entries. Later duplicates of an id
    /// replace earlier ones, keeping the original position.
    pub fn from_entries(
        entries: Vec<CatalogEntry>,
        source: CatalogSource,
        options: CatalogOptions,
    ) -> Self {
        let mut deduped: Vec<CatalogEntry> = Vec::with_capacity(entries.len());
        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for entry in entries {
            match by_id.get(&entry.id) {
                Some(&idx) => deduped[idx] = entry,
                None => {
                    by_id.insert(entry.id.clone(), deduped.len());
                    deduped.push(entry);
                }
            }
        }

        let names_lower: Vec<String> = deduped.iter().map(|e| e.name.to_lowercase()).collect();
        let mut by_name_lower = HashMap::with_capacity(deduped.len());
        for (idx, lower) in names_lower.iter().enumerate() {
            by_name_lower.insert(lower.clone(), idx);
        }

        Self {
            entries: deduped,
            names_lower,
            by_id,
            by_name_lower,
            source,
            options,
        }
    }

    /// The built-in fallback list of common drugs.
    pub fn seed(options: CatalogOptions) -> Self {
        info!("drug catalog seeded with {} built-in drugs", SEED.len());
        let entries = SEED
            .iter()
            .map(|(id, name, description, category, factors)| CatalogEntry {
                id: (*id).to_string(),
                name: (*name).to_string(),
                description: (*description).to_string(),
                category: (*category).to_string(),
                elderly_risk_factors: factors.iter().map(|f| (*f).to_string()).collect(),
            })
            .collect();
        Self::from_entries(entries, CatalogSource::Seed, options)
    }

    /// Ranked name search: exact matches first, then prefix matches, then
    /// substring matches, skipping drugs already selected, until `limit`
    /// results are collected. Queries below the minimum length return
    /// nothing.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<CatalogEntry> {
        let limit = limit.unwrap_or(self.options.default_limit);
        let q = query.trim().to_lowercase();
        if q.chars().count() < self.options.min_query_len || limit == 0 {
            return Vec::new();
        }

        let mut picked: Vec<usize> = Vec::new();
        for (idx, lower) in self.names_lower.iter().enumerate() {
            if picked.len() >= limit {
                break;
            }
            if lower.as_str() == q {
                picked.push(idx);
            }
        }
        for (idx, lower) in self.names_lower.iter().enumerate() {
            if picked.len() >= limit {
                break;
            }
            if lower.starts_with(&q) && !picked.contains(&idx) {
                picked.push(idx);
            }
        }
        for (idx, lower) in self.names_lower.iter().enumerate() {
            if picked.len() >= limit {
                break;
            }
            if lower.contains(&q) && !picked.contains(&idx) {
                picked.push(idx);
            }
        }

        picked.iter().map(|&idx| self.entries[idx].clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name_lower
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn stats(&self) -> CatalogStats {
        let mut categories: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            *categories.entry(entry.category.clone()).or_insert(0) += 1;
        }
        CatalogStats {
            total_drugs: self.entries.len(),
            with_descriptions: self
                .entries
                .iter()
                .filter(|e| !e.description.is_empty())
                .count(),
            source: self.source,
            categories,
        }
    }
}

fn parse_risk_factors(raw: &str) -> Vec<String> {
    if raw.is_empty() || raw == "[]" {
        return Vec::new();
    }
    match serde_json::from_str(raw) {
        Ok(factors) => factors,
        Err(_) => {
            debug!("unreadable elderly-risk column: {}", raw);
            Vec::new()
        }
    }
}

// Fallback drugs used when no catalog file is available.
const SEED: &[(&str, &str, &str, &str, &[&str])] = &[
    (
        "DB00001",
        "Warfarin",
        "Vitamin K antagonist anticoagulant for thromboembolism prevention",
        "anticoagulant",
        &["bleeding risk", "requires INR monitoring", "many drug interactions"],
    ),
    (
        "DB00002",
        "Aspirin",
        "Antiplatelet agent and analgesic",
        "antiplatelet",
        &["GI bleeding risk", "additive bleeding with anticoagulants"],
    ),
    (
        "DB00003",
        "Metformin",
        "First-line oral antihyperglycemic for type 2 diabetes",
        "antidiabetic",
        &["lactic acidosis risk with renal impairment"],
    ),
    (
        "DB00004",
        "Lisinopril",
        "ACE inhibitor for hypertension and heart failure",
        "ace-inhibitor",
        &["hyperkalemia risk", "renal function decline"],
    ),
    (
        "DB00005",
        "Furosemide",
        "Loop diuretic for edema and heart failure",
        "diuretic",
        &["electrolyte disturbance", "dehydration and falls"],
    ),
    (
        "DB00006",
        "Digoxin",
        "Cardiac glycoside for heart failure and atrial fibrillation",
        "cardiac-glycoside",
        &["narrow therapeutic index", "toxicity with renal impairment"],
    ),
    (
        "DB00007",
        "Atorvastatin",
        "HMG-CoA reductase inhibitor for hyperlipidemia",
        "statin",
        &["myopathy risk", "hepatic enzyme elevation"],
    ),
    (
        "DB00008",
        "Omeprazole",
        "Proton pump inhibitor for acid-related disorders",
        "proton-pump-inhibitor",
        &["fracture risk with long-term use", "B12 deficiency"],
    ),
    (
        "DB00009",
        "Insulin",
        "Injectable hormone for glycemic control",
        "antidiabetic",
        &["hypoglycemia risk", "dosing errors"],
    ),
    (
        "DB00010",
        "Amlodipine",
        "Dihydropyridine calcium channel blocker for hypertension",
        "calcium-channel-blocker",
        &["orthostatic hypotension", "peripheral edema"],
    ),
];
