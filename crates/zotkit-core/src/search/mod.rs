//! Search over the denormalized document
//!
//! The index builder projects aggregate records into two FTS files; the
//! planner turns (scope, text) into a concrete query; this façade wires
//! both to the configuration and degrades malformed query syntax to an
//! empty result with a reason instead of an error bubble.

mod index;
mod query;

pub use index::{score_matchinfo, SearchIndex, TABLE};
pub use query::{QueryPlan, QueryPlanner, Scope, TableChoice};

use std::path::PathBuf;

use crate::config::WorkflowConfig;
use crate::error::{SearchError, ZotError};
use crate::reader::RelationalReader;

/// One search result row
#[derive(Clone, Debug)]
pub struct SearchHit {
    pub key: String,
    pub score: f64,
    /// Display name for group-listing results; item searches resolve
    /// display data from the JSON document instead
    pub label: Option<String>,
}

/// Search outcome: hits, or a recoverable reason for having none
#[derive(Debug, Default)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    /// Set when the query text itself was malformed; distinguishes "no
    /// matches" from "unusable query"
    pub invalid_query: Option<String>,
}

/// Executes planned searches against the index files and the clone
pub struct Searcher<'a> {
    config: &'a WorkflowConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(config: &'a WorkflowConfig) -> Self {
        Self { config }
    }

    /// Plan and run one search. Unknown scopes are hard errors; malformed
    /// query syntax is not.
    pub fn search(
        &self,
        scope: &Scope,
        query: &str,
        limit: usize,
    ) -> Result<SearchResponse, ZotError> {
        let planner = QueryPlanner::new(&self.config.search);
        let plan = planner.plan(scope, query).map_err(ZotError::Search)?;
        match plan {
            QueryPlan::Match { table, expr } => {
                let index = SearchIndex::open(
                    &self.index_path(table),
                    self.config.search.weights.clone(),
                )
                .map_err(ZotError::Index)?;
                match index.search_keys(&expr, limit) {
                    Ok(rows) => Ok(SearchResponse {
                        hits: rows
                            .into_iter()
                            .map(|(key, score)| SearchHit {
                                key,
                                score,
                                label: None,
                            })
                            .collect(),
                        invalid_query: None,
                    }),
                    Err(SearchError::InvalidQuery(reason)) => {
                        tracing::debug!(%reason, "query text rejected by the full-text engine");
                        Ok(SearchResponse {
                            hits: Vec::new(),
                            invalid_query: Some(reason),
                        })
                    }
                    Err(other) => Err(ZotError::Search(other)),
                }
            }
            QueryPlan::ListCollections(term) => self.list(&term, true, limit),
            QueryPlan::ListTags(term) => self.list(&term, false, limit),
        }
    }

    /// Group-listing searches hit the relational clone, not the index.
    /// The same result limit applies as on the index path.
    fn list(&self, term: &str, collections: bool, limit: usize) -> Result<SearchResponse, ZotError> {
        let reader =
            RelationalReader::open(&self.config.paths.clone_path()).map_err(ZotError::Reader)?;
        let mut rows = if collections {
            reader.collections_matching(term)
        } else {
            reader.tags_matching(term)
        }
        .map_err(ZotError::Reader)?;
        rows.truncate(limit);
        Ok(SearchResponse {
            hits: rows
                .into_iter()
                .map(|row| SearchHit {
                    key: row.key,
                    score: 0.0,
                    label: Some(row.name),
                })
                .collect(),
            invalid_query: None,
        })
    }

    fn index_path(&self, table: TableChoice) -> PathBuf {
        match table {
            TableChoice::Unicode => self.config.paths.index_path(),
            TableChoice::AsciiFolded => self.config.paths.folded_index_path(),
        }
    }
}
