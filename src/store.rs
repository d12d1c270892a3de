//! JSON file persistence for patient records.
//!
//! Records are stored one per file as `{prefix}{unix_millis}.json`
//! inside a flat data directory, wrapped in an envelope that carries
//! the record kind and save time. Filenames are validated on every
//! read and delete so the directory is the only reachable location.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::utils::unix_millis;

/// The four record kinds the service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Patient,
    Extracted,
    Analysis,
    CompletePatient,
}

impl RecordKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Patient => "patient-",
            RecordKind::Extracted => "extracted-",
            RecordKind::Analysis => "analysis-",
            RecordKind::CompletePatient => "complete-patient-",
        }
    }

    /// Recover the kind from a stored filename. "complete-patient-" is
    /// checked before "patient-" because the latter is its suffix.
    pub fn from_filename(name: &str) -> Option<Self> {
        for kind in [
            RecordKind::CompletePatient,
            RecordKind::Patient,
            RecordKind::Extracted,
            RecordKind::Analysis,
        ] {
            if name.starts_with(kind.prefix()) {
                return Some(kind);
            }
        }
        None
    }
}

/// On-disk envelope around the caller's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub kind: RecordKind,
    pub saved_at: String,
    pub payload: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid filename: {0}")]
    InvalidName(String),
    #[error("no stored file named {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("stored file {0} is not valid JSON: {1}")]
    Corrupt(String, String),
    #[error("could not encode record: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveReceipt {
    pub filename: String,
    pub saved_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredFileEntry {
    pub filename: String,
    pub kind: RecordKind,
    pub saved_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_files: usize,
    pub patients: usize,
    pub extracted: usize,
    pub analyses: usize,
    pub complete_patients: usize,
    pub total_bytes: u64,
}

/// A flat directory of JSON record files.
#[derive(Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Persist a payload under a fresh timestamped filename.
    #[instrument(skip(self, payload), fields(kind = ?kind))]
    pub async fn save(&self, kind: RecordKind, payload: Value) -> Result<SaveReceipt, StoreError> {
        let filename = format!("{}{}.json", kind.prefix(), unix_millis());
        let saved_at = Utc::now().to_rfc3339();
        let record = StoredRecord {
            kind,
            saved_at: saved_at.clone(),
            payload,
        };
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|err| StoreError::Encode(err.to_string()))?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        Ok(SaveReceipt { filename, saved_at })
    }

    /// List stored records, newest first. Files whose names do not
    /// match the store's naming scheme are ignored; files that fail to
    /// parse are skipped with a warning rather than failing the listing.
    pub async fn list(&self) -> Result<Vec<StoredFileEntry>, StoreError> {
        let mut names = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if validate_filename(&name).is_ok() {
                names.push(name);
            }
        }

        let reads = names.iter().map(|name| self.read_record(name.clone()));
        let mut entries = Vec::with_capacity(names.len());
        for result in futures::future::join_all(reads).await {
            match result {
                Ok(entry) => entries.push(entry),
                Err(StoreError::Corrupt(name, err)) => {
                    warn!("skipping corrupt stored file {}: {}", name, err);
                }
                Err(err) => return Err(err),
            }
        }

        entries.sort_by(|a, b| name_millis(&b.filename).cmp(&name_millis(&a.filename)));
        Ok(entries)
    }

    async fn read_record(&self, filename: String) -> Result<StoredFileEntry, StoreError> {
        let raw = tokio::fs::read(self.dir.join(&filename)).await?;
        let record: StoredRecord = serde_json::from_slice(&raw)
            .map_err(|err| StoreError::Corrupt(filename.clone(), err.to_string()))?;
        Ok(StoredFileEntry {
            filename,
            kind: record.kind,
            saved_at: record.saved_at,
        })
    }

    /// Fetch one stored record by filename.
    pub async fn get(&self, filename: &str) -> Result<StoredRecord, StoreError> {
        validate_filename(filename)?;
        let raw = match tokio::fs::read(self.dir.join(filename)).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(filename.to_string()))
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&raw)
            .map_err(|err| StoreError::Corrupt(filename.to_string(), err.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, filename: &str) -> Result<(), StoreError> {
        validate_filename(filename)?;
        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(filename.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats {
            total_files: 0,
            patients: 0,
            extracted: 0,
            analyses: 0,
            complete_patients: 0,
            total_bytes: 0,
        };
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(kind) = validate_filename(&name).ok() else {
                continue;
            };
            stats.total_files += 1;
            match kind {
                RecordKind::Patient => stats.patients += 1,
                RecordKind::Extracted => stats.extracted += 1,
                RecordKind::Analysis => stats.analyses += 1,
                RecordKind::CompletePatient => stats.complete_patients += 1,
            }
            if let Ok(meta) = entry.metadata().await {
                stats.total_bytes += meta.len();
            }
        }
        Ok(stats)
    }
}

/// A valid name is `{known prefix}{digits}.json` with nothing else in
/// it. Anything containing separators or dots beyond the extension is
/// rejected, which keeps path traversal out.
fn validate_filename(name: &str) -> Result<RecordKind, StoreError> {
    let kind = RecordKind::from_filename(name)
        .ok_or_else(|| StoreError::InvalidName(name.to_string()))?;
    let rest = &name[kind.prefix().len()..];
    let millis = match rest.strip_suffix(".json") {
        Some(millis) => millis,
        None => return Err(StoreError::InvalidName(name.to_string())),
    };
    if millis.is_empty() || !millis.chars().all(|c| c.is_ascii_digit()) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(kind)
}

fn name_millis(name: &str) -> i64 {
    RecordKind::from_filename(name)
        .and_then(|kind| {
            name[kind.prefix().len()..]
                .strip_suffix(".json")
                .and_then(|m| m.parse().ok())
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn save_then_get_roundtrips_payload() {
        let (_dir, store) = store().await;
        let payload = json!({"name": "Ada", "age": 72});
        let receipt = store.save(RecordKind::Patient, payload.clone()).await.unwrap();

        assert!(receipt.filename.starts_with("patient-"));
        assert!(receipt.filename.ends_with(".json"));

        let record = store.get(&receipt.filename).await.unwrap();
        assert_eq!(record.kind, RecordKind::Patient);
        assert_eq!(record.payload, payload);
        assert_eq!(record.saved_at, receipt.saved_at);
    }

    #[tokio::test]
    async fn each_kind_gets_its_prefix() {
        let (_dir, store) = store().await;
        for (kind, prefix) in [
            (RecordKind::Patient, "patient-"),
            (RecordKind::Extracted, "extracted-"),
            (RecordKind::Analysis, "analysis-"),
            (RecordKind::CompletePatient, "complete-patient-"),
        ] {
            let receipt = store.save(kind, json!({})).await.unwrap();
            assert!(
                receipt.filename.starts_with(prefix),
                "{} should start with {}",
                receipt.filename,
                prefix
            );
            assert_eq!(RecordKind::from_filename(&receipt.filename), Some(kind));
        }
    }

    #[tokio::test]
    async fn rejects_names_outside_the_scheme() {
        let (_dir, store) = store().await;
        for name in [
            "../etc/passwd",
            "patient-123.json.bak",
            "patient-abc.json",
            "nope-123.json",
            "patient-.json",
            "patient-123",
        ] {
            assert!(
                matches!(store.get(name).await, Err(StoreError::InvalidName(_))),
                "{} should be rejected",
                name
            );
            assert!(matches!(
                store.delete(name).await,
                Err(StoreError::InvalidName(_))
            ));
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.get("patient-123.json").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("patient-123.json").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_skips_corrupt_files() {
        let (dir, store) = store().await;
        let older = StoredRecord {
            kind: RecordKind::Patient,
            saved_at: "2024-01-01T00:00:00+00:00".to_string(),
            payload: json!({}),
        };
        let newer = StoredRecord {
            kind: RecordKind::Analysis,
            saved_at: "2024-01-02T00:00:00+00:00".to_string(),
            payload: json!({}),
        };
        std::fs::write(
            dir.path().join("patient-100.json"),
            serde_json::to_vec(&older).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("analysis-200.json"),
            serde_json::to_vec(&newer).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("extracted-300.json"), b"{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "analysis-200.json");
        assert_eq!(entries[1].filename, "patient-100.json");
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let (_dir, store) = store().await;
        let receipt = store.save(RecordKind::Extracted, json!({"x": 1})).await.unwrap();
        store.delete(&receipt.filename).await.unwrap();
        assert!(matches!(
            store.get(&receipt.filename).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stats_count_kinds_and_bytes() {
        let (_dir, store) = store().await;
        store.save(RecordKind::Patient, json!({"a": 1})).await.unwrap();
        store
            .save(RecordKind::CompletePatient, json!({"b": 2}))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.patients, 1);
        assert_eq!(stats.complete_patients, 1);
        assert_eq!(stats.extracted, 0);
        assert!(stats.total_bytes > 0);
    }
}
