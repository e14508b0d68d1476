//! Full-text index files
//!
//! Two physical SQLite files hold logically identical rows: one keeps the
//! original Unicode text, the other is ASCII-folded at load time. Each
//! holds a single `search` virtual table whose columns come from the
//! configured field map. Ranking is a custom scalar function over FTS4
//! matchinfo statistics registered per connection.

use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ToSql};
use serde_json::Value;

use crate::config::SearchConfig;
use crate::domain::AggregateRecord;
use crate::error::{IndexError, SearchError};
use crate::fold::ascii_fold;

/// Name of the virtual table inside each index file
pub const TABLE: &str = "search";

/// One open physical index file
pub struct SearchIndex {
    conn: Connection,
}

impl SearchIndex {
    /// Open (or create) an index file and register the ranking function
    /// with the given per-column weights.
    pub fn open(path: &Path, weights: Vec<f64>) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        register_rank(&conn, weights)?;
        Ok(Self { conn })
    }

    /// In-memory index (for testing)
    pub fn open_in_memory(weights: Vec<f64>) -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        register_rank(&conn, weights)?;
        Ok(Self { conn })
    }

    /// Drop and recreate the virtual table. The schema is exactly one FTS4
    /// table with the field map's columns in declared order.
    pub fn create_schema(&self, config: &SearchConfig) -> Result<(), IndexError> {
        let column_names = config.column_names();
        for filter in &config.filters {
            for column in &filter.columns {
                if !column_names.contains(&column.as_str()) {
                    return Err(IndexError::UnknownColumn(column.clone()));
                }
            }
        }
        let columns = column_names.join(", ");
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {TABLE}"))?;
        self.conn.execute_batch(&format!(
            "CREATE VIRTUAL TABLE {TABLE} USING fts4({columns})"
        ))?;
        Ok(())
    }

    /// Project every record through the field map and bulk-load the rows.
    /// `fold_ascii` selects the transliterated variant.
    pub fn populate(
        &mut self,
        records: &[AggregateRecord],
        config: &SearchConfig,
        fold_ascii: bool,
    ) -> Result<(), IndexError> {
        let column_names = config.column_names();
        let placeholders: Vec<String> = (1..=column_names.len())
            .map(|i| format!("?{}", i))
            .collect();
        let sql = format!(
            "INSERT OR IGNORE INTO {TABLE} ({}) VALUES ({})",
            column_names.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                let json = serde_json::to_value(record)?;
                let row = project_row(&json, config, fold_ascii);
                let params: Vec<&dyn ToSql> =
                    row.iter().map(|value| value as &dyn ToSql).collect();
                stmt.execute(params.as_slice())?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Run a MATCH query, returning (key, score) best-first. Score ties
    /// fall back to the engine's stable row order.
    pub fn search_keys(
        &self,
        match_expr: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, SearchError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT key, search_rank(matchinfo({TABLE})) AS score
                 FROM {TABLE} WHERE {TABLE} MATCH ?1
                 ORDER BY score DESC LIMIT ?2"
            ))
            .map_err(SearchError::from)?;
        let rows = stmt
            .query_map(rusqlite::params![match_expr, limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(SearchError::from)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(SearchError::from)?;
        Ok(rows)
    }
}

/// One projected row in field-map column order
fn project_row(record_json: &Value, config: &SearchConfig, fold_ascii: bool) -> Vec<String> {
    config
        .field_map
        .iter()
        .map(|column| {
            let joined = column.path.resolve(record_json).join(" ");
            if fold_ascii {
                ascii_fold(&joined)
            } else {
                joined
            }
        })
        .collect()
}

/// Register the weighted matchinfo scorer as `search_rank`
fn register_rank(conn: &Connection, weights: Vec<f64>) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "search_rank",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        move |ctx| {
            let blob = match ctx.get_raw(0) {
                rusqlite::types::ValueRef::Blob(blob) => blob,
                _ => return Ok(0.0),
            };
            Ok(score_matchinfo(blob, &weights))
        },
    )
}

/// Weighted normalized term-frequency over an FTS4 matchinfo blob in the
/// default `pcx` format: two header words (phrase count, column count)
/// then a (hits this row, hits all rows, docs with hits) triple per phrase
/// per column.
pub fn score_matchinfo(blob: &[u8], weights: &[f64]) -> f64 {
    let words: Vec<u32> = blob
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    if words.len() < 2 {
        return 0.0;
    }
    let phrases = words[0] as usize;
    let columns = words[1] as usize;
    let mut score = 0.0;
    for phrase in 0..phrases {
        for column in 0..columns {
            let base = 2 + 3 * (phrase * columns + column);
            if base + 1 >= words.len() {
                return score;
            }
            let hits_this_row = words[base] as f64;
            let hits_all_rows = words[base + 1] as f64;
            if hits_all_rows > 0.0 {
                let weight = weights.get(column).copied().unwrap_or(1.0);
                score += (hits_this_row / hits_all_rows) * weight;
            }
        }
    }
    score
}
