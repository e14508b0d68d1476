//! Declarative projection paths into aggregate records
//!
//! The search index decides what text lands in each column through a small
//! path language rather than per-column extraction code: a path is a flat
//! key, a (key, subkey) pair applied to a dict or to each element of a
//! list, or a prioritized list of alternatives where the first non-empty
//! resolution wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One projection path into a record rendered as JSON
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FieldPath {
    /// Flat key; a string value yields one entry, an array of strings
    /// yields one entry per element
    Direct(String),
    /// Two-level lookup: `record[key][subkey]` for a dict, or
    /// `element[subkey]` for each element when `record[key]` is a list
    Nested(String, String),
    /// Alternatives tried in order until one resolves non-empty
    FirstOf(Vec<FieldPath>),
}

impl FieldPath {
    /// Resolve this path against a record, collecting every matching
    /// string. Missing keys and non-string leaves resolve to nothing;
    /// resolution is total and never fails.
    pub fn resolve(&self, record: &Value) -> Vec<String> {
        match self {
            FieldPath::Direct(key) => collect_strings(record.get(key)),
            FieldPath::Nested(key, subkey) => match record.get(key) {
                Some(Value::Object(map)) => collect_strings(map.get(subkey)),
                Some(Value::Array(items)) => items
                    .iter()
                    .flat_map(|item| collect_strings(item.get(subkey)))
                    .collect(),
                _ => Vec::new(),
            },
            FieldPath::FirstOf(alternatives) => alternatives
                .iter()
                .map(|path| path.resolve(record))
                .find(|values| !values.is_empty())
                .unwrap_or_default(),
        }
    }
}

fn collect_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "key": "ABCD2345",
            "notes": ["first note", "second note"],
            "data": {
                "title": "Epistemic Infrastructure",
                "issued": "2019"
            },
            "creators": [
                {"family": "Okafor", "given": "Ada"},
                {"family": "Reyes", "given": "Luz"}
            ]
        })
    }

    #[test]
    fn test_direct_string() {
        let path = FieldPath::Direct("key".into());
        assert_eq!(path.resolve(&record()), vec!["ABCD2345"]);
    }

    #[test]
    fn test_direct_list_of_strings() {
        let path = FieldPath::Direct("notes".into());
        assert_eq!(path.resolve(&record()), vec!["first note", "second note"]);
    }

    #[test]
    fn test_nested_dict() {
        let path = FieldPath::Nested("data".into(), "title".into());
        assert_eq!(path.resolve(&record()), vec!["Epistemic Infrastructure"]);
    }

    #[test]
    fn test_nested_list_collects_each_element() {
        let path = FieldPath::Nested("creators".into(), "family".into());
        assert_eq!(path.resolve(&record()), vec!["Okafor", "Reyes"]);
    }

    #[test]
    fn test_first_of_takes_first_non_empty() {
        let path = FieldPath::FirstOf(vec![
            FieldPath::Nested("data".into(), "container-title".into()),
            FieldPath::Nested("data".into(), "title".into()),
        ]);
        assert_eq!(path.resolve(&record()), vec!["Epistemic Infrastructure"]);
    }

    #[test]
    fn test_missing_key_resolves_empty() {
        let path = FieldPath::Direct("missing".into());
        assert!(path.resolve(&record()).is_empty());
    }
}
