//! Pairwise drug interaction table and the catalog-to-table id join.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::utils::split_csv_line;

/// Default cap on interaction rows read from the data file.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Clinical severity of a drug pair taken together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Severe => "severe",
        }
    }

    /// Parse a severity label. Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "minor" => Some(Severity::Low),
            "moderate" => Some(Severity::Moderate),
            "high" | "major" => Some(Severity::High),
            "severe" => Some(Severity::Severe),
            _ => None,
        }
    }

    /// Contribution of one matched pair to the risk score.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 0.5,
            Severity::Moderate => 1.0,
            Severity::High => 1.5,
            Severity::Severe => 2.0,
        }
    }

    fn rank(&self) -> i32 {
        match self {
            Severity::Low => 1,
            Severity::Moderate => 2,
            Severity::High => 3,
            Severity::Severe => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the interaction table, in the table's own id space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub drug_a: String, // e.g., "CID000000001"
    pub drug_b: String,
    pub side_effect: String,
    pub severity: Severity,
    pub interaction_type: String,
    pub severity_score: i32,
}

/// Result of one pairwise lookup.
///
/// The join between catalog ids and the interaction table is a synthetic
/// string transformation, so "nothing found" has two distinct causes that
/// callers must be able to tell apart: the pair never made it into the
/// table's id space, or it did and no record exists.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// One or both ids had no interaction-table form.
    Unmapped,
    /// The pair was joined; zero or more records matched.
    Mapped(Vec<InteractionRecord>),
}

/// Lookup seam used by the risk scorer.
#[cfg_attr(test, mockall::automock)]
pub trait InteractionLookup {
    fn pair(&self, id_a: &str, id_b: &str) -> PairOutcome;
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionStats {
    pub total_interactions: usize,
    pub severe: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub unique_drugs: usize,
}

/// In-memory interaction table keyed by the first drug of each row.
pub struct InteractionTable {
    by_first: HashMap<String, Vec<InteractionRecord>>,
    total: usize,
}

impl InteractionTable {
    /// Load the table from a comma-separated file, reading at most
    /// `max_rows` data rows. Expected columns: drug1, drug2, side effect,
    /// severity, interaction type, numeric severity, has-interaction flag
    /// ("1" keeps the row). Rows with missing columns or unknown severity
    /// labels are skipped with a warning. A missing file yields an empty
    /// table.
    pub fn load_from_file(path: &Path, max_rows: usize) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "could not read interaction table {}: {}, interactions disabled",
                    path.display(),
                    err
                );
                return Self::from_records(Vec::new());
            }
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in raw.lines().skip(1).take(max_rows) {
            if line.trim().is_empty() {
                continue;
            }
            let parts = split_csv_line(line);
            if parts.len() < 7 {
                skipped += 1;
                if skipped <= 10 {
                    warn!("skipping malformed interaction row: {} columns", parts.len());
                }
                continue;
            }
            if parts[6] != "1" {
                continue;
            }
            let severity = match Severity::parse(&parts[3]) {
                Some(severity) => severity,
                None => {
                    skipped += 1;
                    if skipped <= 10 {
                        warn!("skipping interaction row with unknown severity {:?}", parts[3]);
                    }
                    continue;
                }
            };
            records.push(InteractionRecord {
                drug_a: parts[0].clone(),
                drug_b: parts[1].clone(),
                side_effect: parts[2].clone(),
                severity,
                interaction_type: parts[4].clone(),
                severity_score: parts[5].parse().unwrap_or_else(|_| severity.rank()),
            });
        }

        info!(
            "loaded {} drug interactions from {} ({} rows skipped)",
            records.len(),
            path.display(),
            skipped
        );
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<InteractionRecord>) -> Self {
        let total = records.len();
        let mut by_first: HashMap<String, Vec<InteractionRecord>> = HashMap::new();
        for record in records {
            by_first.entry(record.drug_a.clone()).or_default().push(record);
        }
        Self { by_first, total }
    }

    /// Transform a catalog id into the interaction table's id space.
    ///
    /// "DB00001" becomes "CID000000001": the "DB" prefix is stripped, the
    /// digits are left-padded to nine characters with zeros, and "CID" is
    /// prefixed. Ids that are not in DrugBank form do not transform.
    pub fn remap_catalog_id(id: &str) -> Option<String> {
        let digits = id.strip_prefix("DB")?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(format!("CID{:0>9}", digits))
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn stats(&self) -> InteractionStats {
        let mut stats = InteractionStats {
            total_interactions: self.total,
            severe: 0,
            high: 0,
            moderate: 0,
            low: 0,
            unique_drugs: self.by_first.len(),
        };
        for records in self.by_first.values() {
            for record in records {
                match record.severity {
                    Severity::Severe => stats.severe += 1,
                    Severity::High => stats.high += 1,
                    Severity::Moderate => stats.moderate += 1,
                    Severity::Low => stats.low += 1,
                }
            }
        }
        stats
    }
}

impl InteractionLookup for InteractionTable {
    fn pair(&self, id_a: &str, id_b: &str) -> PairOutcome {
        let (mapped_a, mapped_b) =
            match (Self::remap_catalog_id(id_a), Self::remap_catalog_id(id_b)) {
                (Some(a), Some(b)) => (a, b),
                _ => return PairOutcome::Unmapped,
            };

        let mut matches = Vec::new();
        if let Some(records) = self.by_first.get(&mapped_a) {
            matches.extend(records.iter().filter(|r| r.drug_b == mapped_b).cloned());
        }
        if let Some(records) = self.by_first.get(&mapped_b) {
            matches.extend(records.iter().filter(|r| r.drug_b == mapped_a).cloned());
        }
        PairOutcome::Mapped(matches)
    }
}
