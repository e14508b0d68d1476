//! zotkit-core: pipeline library for the zotkit launcher plugin
//!
//! This library turns a reference manager's normalized relational database
//! into the artifacts a desktop launcher needs for instant search:
//! - RelationalReader: read-only typed queries against the source schema
//! - FieldTranslator: source vocabulary -> CSL-like standard vocabulary
//! - DenormalizationEngine: one flat aggregate record per item
//! - JsonStore: the persisted document, plus the freshness chain
//! - search: two FTS index files (Unicode and ASCII-folded), a weighted
//!   matchinfo ranker, and the scope-aware query planner
//! - Pipeline: the full clone -> read -> JSON -> index refresh cycle
//! - CitationClient: thin interface to the remote formatting API

pub mod cite;
pub mod config;
pub mod denorm;
pub mod domain;
pub mod error;
pub mod fieldmap;
pub mod fold;
pub mod notes;
pub mod pipeline;
pub mod reader;
pub mod search;
pub mod store;
pub mod translate;

// Re-export the main types for convenience
pub use cite::{Citation, CitationClient};
pub use config::{ColumnSpec, Filter, SearchConfig, WorkflowConfig};
pub use denorm::DenormalizationEngine;
pub use domain::{AggregateRecord, Attachment, CollectionRef, Creator, TagRef};
pub use error::{Result, Stage, ZotError};
pub use fieldmap::FieldPath;
pub use pipeline::{Pipeline, RefreshReport};
pub use reader::RelationalReader;
pub use search::{QueryPlanner, Scope, SearchHit, SearchIndex, SearchResponse, Searcher};
pub use store::{diff_keys, is_stale, Document, JsonStore, StaleReason};
pub use translate::{Direction, FieldTranslator, Kind};
