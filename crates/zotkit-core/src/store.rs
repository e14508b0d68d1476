//! JSON document store and freshness chain
//!
//! The denormalized document is one JSON object keyed by item key. The
//! previous document is copied aside before every overwrite, and writes go
//! through a temp file plus atomic rename so a killed refresh can never
//! leave a torn document behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::domain::AggregateRecord;
use crate::error::StoreError;

/// The persisted artifact: item key -> aggregate record. BTreeMap keeps
/// serialization order stable so an unchanged source produces identical
/// bytes.
pub type Document = BTreeMap<String, AggregateRecord>;

/// Which artifact in the freshness chain is out of date
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaleReason {
    /// The clone lags the source database
    Clone,
    /// The JSON document lags the clone
    Json,
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleReason::Clone => write!(f, "Clone"),
            StaleReason::Json => write!(f, "JSON"),
        }
    }
}

/// Slack allowed between clone and cache modification times before the
/// cache counts as stale
pub const STALE_TOLERANCE_SECS: u64 = 10;

/// Staleness core over raw modification times (seconds). A missing time is
/// definitely stale. Clone-staleness takes priority; only one reason is
/// ever reported.
pub fn staleness(
    source_mod: Option<u64>,
    clone_mod: Option<u64>,
    cache_mod: Option<u64>,
) -> Option<StaleReason> {
    let clone_mod = match clone_mod {
        Some(t) => t,
        None => return Some(StaleReason::Clone),
    };
    if let Some(source_mod) = source_mod {
        if source_mod > clone_mod {
            return Some(StaleReason::Clone);
        }
    } else {
        return Some(StaleReason::Clone);
    }
    match cache_mod {
        Some(cache_mod) if clone_mod <= cache_mod + STALE_TOLERANCE_SECS => None,
        _ => Some(StaleReason::Json),
    }
}

/// Filesystem staleness check across the chain
/// source database -> clone -> JSON document.
pub fn is_stale(
    source_path: &Path,
    clone_path: &Path,
    cache_path: &Path,
) -> (bool, Option<StaleReason>) {
    let reason = staleness(
        mtime_secs(source_path),
        mtime_secs(clone_path),
        mtime_secs(cache_path),
    );
    (reason.is_some(), reason)
}

fn mtime_secs(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()?
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Persists the aggregate document
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backup location of the previous document
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    /// Load the current document; a missing file is an empty document
    pub fn load(&self) -> Result<Document, StoreError> {
        if !self.path.exists() {
            return Ok(Document::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the document: previous copy goes to the backup location
    /// first, then the new bytes land via temp file + atomic rename.
    pub fn save(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if self.path.exists() {
            std::fs::copy(&self.path, self.backup_path())?;
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load the backup written by the previous refresh, if any
    pub fn load_backup(&self) -> Result<Document, StoreError> {
        let backup = self.backup_path();
        if !backup.exists() {
            return Ok(Document::new());
        }
        let text = std::fs::read_to_string(backup)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Keys present in `new` but not in `old`: "what's new since last refresh"
pub fn diff_keys(old: &Document, new: &Document) -> Vec<String> {
    new.keys()
        .filter(|key| !old.contains_key(*key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AggregateRecord;

    #[test]
    fn test_stale_clone_when_source_newer() {
        assert_eq!(
            staleness(Some(100), Some(50), Some(50)),
            Some(StaleReason::Clone)
        );
    }

    #[test]
    fn test_fresh_when_chain_in_order() {
        assert_eq!(staleness(Some(50), Some(100), Some(100)), None);
    }

    #[test]
    fn test_stale_json_when_cache_lags_clone() {
        assert_eq!(
            staleness(Some(50), Some(100), Some(85)),
            Some(StaleReason::Json)
        );
    }

    #[test]
    fn test_cache_within_tolerance_is_fresh() {
        assert_eq!(staleness(Some(50), Some(100), Some(95)), None);
    }

    #[test]
    fn test_missing_files_are_definitely_stale() {
        assert_eq!(staleness(Some(100), None, None), Some(StaleReason::Clone));
        assert_eq!(staleness(None, Some(100), Some(100)), Some(StaleReason::Clone));
        assert_eq!(staleness(Some(50), Some(100), None), Some(StaleReason::Json));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(StaleReason::Clone.to_string(), "Clone");
        assert_eq!(StaleReason::Json.to_string(), "JSON");
    }

    #[test]
    fn test_save_load_roundtrip_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("records.json"));

        let mut first = Document::new();
        first.insert(
            "AAAA1111".into(),
            AggregateRecord::new("AAAA1111".into(), "0".into(), "book".into()),
        );
        store.save(&first).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
        assert!(!store.backup_path().exists());

        let mut second = first.clone();
        second.insert(
            "BBBB2222".into(),
            AggregateRecord::new("BBBB2222".into(), "0".into(), "book".into()),
        );
        store.save(&second).unwrap();

        let backup = store.load_backup().unwrap();
        assert_eq!(backup.len(), 1);
        assert_eq!(diff_keys(&backup, &store.load().unwrap()), vec!["BBBB2222"]);
    }

    #[test]
    fn test_missing_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("records.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("records.json"));
        let mut doc = Document::new();
        doc.insert(
            "ZZZZ9999".into(),
            AggregateRecord::new("ZZZZ9999".into(), "0".into(), "article-journal".into()),
        );
        store.save(&doc).unwrap();
        let first_bytes = std::fs::read(store.path()).unwrap();
        store.save(&doc).unwrap();
        let second_bytes = std::fs::read(store.path()).unwrap();
        assert_eq!(first_bytes, second_bytes);
    }
}
