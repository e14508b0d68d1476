//! Refresh orchestration
//!
//! The freshness chain runs source database -> clone -> JSON document ->
//! index files, strictly downstream-to-upstream and always as a full
//! rebuild. Every stage that replaces an artifact goes through a temp file
//! and an atomic rename, so a refresh killed mid-flight leaves the previous
//! artifacts valid.

use std::path::Path;

use crate::config::WorkflowConfig;
use crate::denorm::DenormalizationEngine;
use crate::error::{Stage, ZotError};
use crate::reader::RelationalReader;
use crate::search::SearchIndex;
use crate::store::{diff_keys, is_stale, Document, JsonStore, StaleReason};

/// Outcome of one refresh invocation
#[derive(Debug)]
pub struct RefreshReport {
    /// Number of records in the rebuilt document
    pub items: usize,
    /// Keys present now that were absent last refresh
    pub new_keys: Vec<String>,
    /// Why the refresh ran, when it did
    pub reason: Option<StaleReason>,
    /// True when everything was already fresh and nothing was rebuilt
    pub skipped: bool,
}

/// Runs the full refresh cycle against one configuration
pub struct Pipeline<'a> {
    config: &'a WorkflowConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a WorkflowConfig) -> Self {
        Self { config }
    }

    /// Refresh all derived artifacts. `force` rebuilds even when the chain
    /// is fresh. On failure the error names the stage that failed and the
    /// previous artifacts remain in place.
    pub fn refresh(&self, force: bool) -> Result<RefreshReport, ZotError> {
        let paths = &self.config.paths;
        let (stale, reason) = is_stale(&paths.zotero_db, &paths.clone_path(), &paths.cache_path());
        if !stale && !force {
            tracing::info!("artifacts are fresh, skipping refresh");
            return Ok(RefreshReport {
                items: 0,
                new_keys: Vec::new(),
                reason: None,
                skipped: true,
            });
        }

        if force || reason == Some(StaleReason::Clone) {
            self.copy_clone()
                .map_err(|e| stage_error(Stage::Clone, e))?;
        }

        let reader = RelationalReader::open(&paths.clone_path())
            .map_err(|e| stage_error(Stage::Read, e))?;
        let records = DenormalizationEngine::new(&reader, self.config)
            .build()
            .map_err(|e| stage_error(Stage::Read, e))?;

        let store = JsonStore::new(paths.cache_path());
        let previous = store.load().unwrap_or_default();
        let document: Document = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        store
            .save(&document)
            .map_err(|e| stage_error(Stage::Json, e))?;
        let new_keys = diff_keys(&previous, &document);

        self.rebuild_indexes(&document)
            .map_err(|e| stage_error(Stage::Index, e))?;

        tracing::info!(
            items = document.len(),
            new = new_keys.len(),
            "refresh complete"
        );
        Ok(RefreshReport {
            items: document.len(),
            new_keys,
            reason,
            skipped: false,
        })
    }

    /// Byte-for-byte copy of the source database, renamed into place so
    /// the previous clone stays valid until the copy is complete.
    fn copy_clone(&self) -> std::io::Result<()> {
        let paths = &self.config.paths;
        std::fs::create_dir_all(&paths.cache_dir)?;
        let target = paths.clone_path();
        let tmp = target.with_extension("sqlite.tmp");
        std::fs::copy(&paths.zotero_db, &tmp)?;
        std::fs::rename(&tmp, &target)?;
        tracing::debug!(source = %paths.zotero_db.display(), "cloned source database");
        Ok(())
    }

    /// Rebuild both physical index files from the freshly written document
    fn rebuild_indexes(&self, document: &Document) -> Result<(), crate::error::IndexError> {
        let records: Vec<_> = document.values().cloned().collect();
        let search = &self.config.search;
        for (path, fold) in [
            (self.config.paths.index_path(), false),
            (self.config.paths.folded_index_path(), true),
        ] {
            rebuild_one_index(&path, &records, search, fold)?;
        }
        Ok(())
    }
}

fn rebuild_one_index(
    path: &Path,
    records: &[crate::domain::AggregateRecord],
    search: &crate::config::SearchConfig,
    fold: bool,
) -> Result<(), crate::error::IndexError> {
    let mut index = SearchIndex::open(path, search.weights.clone())?;
    index.create_schema(search)?;
    index.populate(records, search, fold)?;
    Ok(())
}

fn stage_error(stage: Stage, error: impl std::fmt::Display) -> ZotError {
    ZotError::Refresh {
        stage,
        message: error.to_string(),
    }
}
