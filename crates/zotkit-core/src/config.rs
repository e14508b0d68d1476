//! Configuration for zotkit
//!
//! One explicit context object constructed at process start and passed by
//! reference into each component. Nothing here is a process-wide singleton;
//! the launcher host hands us a settings file and a cache directory and the
//! rest is derived.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ZotError;
use crate::fieldmap::FieldPath;

/// System-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Filesystem locations of the source database and derived artifacts
    pub paths: PathsConfig,
    /// Attachment handling settings
    pub attachments: AttachmentConfig,
    /// Search index and query settings
    pub search: SearchConfig,
    /// Remote citation-formatting service settings
    pub citation: CitationConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            attachments: AttachmentConfig::default(),
            search: SearchConfig::default(),
            citation: CitationConfig::default(),
        }
    }
}

impl WorkflowConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ZotError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ZotError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&text).map_err(|e| ZotError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from the given file, or fall back to defaults when absent
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ZotError> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The reference manager's live database (read-only from our side)
    pub zotero_db: PathBuf,
    /// The reference manager's data directory; internal attachment storage
    /// lives under `<data_dir>/storage/<key>/`
    pub data_dir: PathBuf,
    /// Root for `attachments:`-prefixed linked files, when configured
    pub attachments_dir: Option<PathBuf>,
    /// Where the clone, the JSON document, and the index files are written
    pub cache_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = home.join("Zotero");
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zotkit");
        Self {
            zotero_db: data_dir.join("zotero.sqlite"),
            data_dir,
            attachments_dir: None,
            cache_dir,
        }
    }
}

impl PathsConfig {
    /// Byte-for-byte copy of the source database taken at last refresh
    pub fn clone_path(&self) -> PathBuf {
        self.cache_dir.join("zotero.sqlite")
    }

    /// The denormalized JSON document
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join("records.json")
    }

    /// Unicode search index file
    pub fn index_path(&self) -> PathBuf {
        self.cache_dir.join("search.db")
    }

    /// ASCII-folded search index file
    pub fn folded_index_path(&self) -> PathBuf {
        self.cache_dir.join("search-ascii.db")
    }

    /// Internal attachment storage root
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }
}

/// Attachment handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    /// Only attachments with these filename extensions (lowercased, no dot)
    /// are carried into the aggregate records
    pub allowed_extensions: Vec<String>,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["pdf", "epub", "doc", "docx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One search column and the record path it projects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub path: FieldPath,
}

/// A named search scope: the subset of columns a query fans out over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub columns: Vec<String>,
}

/// Search index and query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Declarative projection from aggregate records into index columns.
    /// Order here is the physical column order of the FTS tables.
    pub field_map: Vec<ColumnSpec>,
    /// Named scopes over the general table
    pub filters: Vec<Filter>,
    /// Per-column ranking weights aligned to `field_map` order; 0 disables
    /// a column
    pub weights: Vec<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            field_map: default_field_map(),
            filters: default_filters(),
            weights: default_weights(),
        }
    }
}

impl SearchConfig {
    /// Physical column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.field_map.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }
}

fn spec(name: &str, path: FieldPath) -> ColumnSpec {
    ColumnSpec {
        name: name.to_string(),
        path,
    }
}

/// Default projection: one column per searchable aggregate sub-field,
/// `key` first so every row carries its record address.
pub fn default_field_map() -> Vec<ColumnSpec> {
    use FieldPath::{Direct, FirstOf, Nested};
    vec![
        spec("key", Direct("key".into())),
        spec(
            "title",
            FirstOf(vec![
                Nested("data".into(), "title".into()),
                Nested("data".into(), "title-short".into()),
            ]),
        ),
        spec("creators", Nested("creators".into(), "family".into())),
        spec(
            "collection_title",
            FirstOf(vec![
                Nested("data".into(), "container-title".into()),
                Nested("data".into(), "collection-title".into()),
            ]),
        ),
        spec("date", Nested("data".into(), "issued".into())),
        spec("tags", Nested("tags".into(), "name".into())),
        spec("collections", Nested("collections".into(), "name".into())),
        spec("attachments", Nested("attachments".into(), "name".into())),
        spec("notes", Direct("notes".into())),
    ]
}

fn filter(name: &str, columns: &[&str]) -> Filter {
    Filter {
        name: name.to_string(),
        columns: columns.iter().map(|s| s.to_string()).collect(),
    }
}

/// Default scopes. `general` spans every searchable column; the rest are
/// single-facet scopes matching the launcher's keyword filters.
pub fn default_filters() -> Vec<Filter> {
    vec![
        filter(
            "general",
            &[
                "title",
                "creators",
                "collection_title",
                "date",
                "tags",
                "collections",
                "attachments",
                "notes",
            ],
        ),
        filter("titles", &["title", "collection_title"]),
        filter("creators", &["creators"]),
        filter("tags", &["tags"]),
        filter("collections", &["collections"]),
        filter("attachments", &["attachments"]),
        filter("notes", &["notes"]),
        filter("date", &["date"]),
    ]
}

/// Equal weight everywhere except `key`, which never contributes to rank
pub fn default_weights() -> Vec<f64> {
    let mut weights = vec![1.0; default_field_map().len()];
    weights[0] = 0.0;
    weights
}

/// Remote citation-formatting service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Base URL of the formatting API
    pub api_base: String,
    /// Library the keys belong to (user id for personal libraries)
    pub library_id: Option<String>,
    /// API key, when the library requires one
    pub api_key: Option<String>,
    /// Default citation style
    pub style: String,
    /// Default locale for rendered citations
    pub locale: String,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.zotero.org".to_string(),
            library_id: None,
            api_key: None,
            style: "apa".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_column_order_starts_with_key() {
        let config = SearchConfig::default();
        assert_eq!(config.column_names()[0], "key");
        assert_eq!(config.field_map.len(), config.weights.len());
        assert_eq!(config.weights[0], 0.0);
    }

    #[test]
    fn test_general_filter_excludes_key() {
        let config = SearchConfig::default();
        let general = config.filter("general").unwrap();
        assert!(!general.columns.contains(&"key".to_string()));
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = WorkflowConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: WorkflowConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.search.field_map.len(), config.search.field_map.len());
        assert_eq!(back.citation.style, "apa");
    }
}
