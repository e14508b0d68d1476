//! Error types for zotkit-core

use thiserror::Error;

/// Result type alias for zotkit operations
pub type Result<T> = std::result::Result<T, ZotError>;

/// Main error type for zotkit operations
#[derive(Error, Debug)]
pub enum ZotError {
    /// Relational reader errors
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// JSON cache store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Search index errors
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Search-time errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Citation service errors
    #[error("Citation error: {0}")]
    Citation(#[from] CitationError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// A refresh stage failed; earlier artifacts are left untouched
    #[error("refresh failed during {stage}: {message}")]
    Refresh { stage: Stage, message: String },
}

/// Pipeline stage reported when a refresh fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Clone,
    Read,
    Json,
    Index,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Clone => "clone copy",
            Stage::Read => "relational read",
            Stage::Json => "JSON write",
            Stage::Index => "index build",
        };
        write!(f, "{}", name)
    }
}

/// Errors from the relational reader
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Source database could not be opened
    #[error("cannot open database {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    /// A query against the source schema failed
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Errors from the JSON cache store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the search index builder
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Field map names a column the schema does not declare
    #[error("unknown search column: {0}")]
    UnknownColumn(String),
}

/// Errors surfaced at search time
#[derive(Error, Debug)]
pub enum SearchError {
    /// Malformed full-text query syntax; callers present this as an
    /// empty result set with a reason, never as a crash
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("unknown scope: {0}")]
    UnknownScope(String),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for SearchError {
    fn from(e: rusqlite::Error) -> Self {
        // FTS reports bad MATCH syntax as a plain SQLITE_ERROR with a
        // recognizable message; fold those into InvalidQuery.
        let text = e.to_string();
        if text.contains("malformed MATCH") || text.contains("fts4: syntax error") {
            SearchError::InvalidQuery(text)
        } else {
            SearchError::Sqlite(e)
        }
    }
}

/// Errors from the remote citation-formatting service
#[derive(Error, Debug)]
pub enum CitationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("citation service returned status {0}")]
    Status(u16),

    /// No library id or API key configured
    #[error("citation service credentials are not configured")]
    MissingCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Clone.to_string(), "clone copy");
        assert_eq!(Stage::Index.to_string(), "index build");
    }

    #[test]
    fn test_malformed_match_becomes_invalid_query() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE VIRTUAL TABLE t USING fts4(a)")
            .unwrap();
        let err = conn
            .prepare("SELECT * FROM t WHERE t MATCH '\"unbalanced'")
            .and_then(|mut s| s.query_row([], |_| Ok(())))
            .unwrap_err();
        let search_err: SearchError = err.into();
        assert!(matches!(search_err, SearchError::InvalidQuery(_)));
    }
}
