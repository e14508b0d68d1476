//! Query planning
//!
//! Turns a (scope, query text) pair into the concrete full-text MATCH
//! expression (or a relational LIKE listing) and picks which physical
//! table to hit. Routing is a correctness requirement: the folded table's
//! content is lossily transliterated, so only pure-ASCII query text may go
//! there.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::fold::is_pure_ascii;

/// What the caller wants searched
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Unscoped fuzzy search across every indexed column
    General,
    /// One named filter (e.g. "titles", "creators")
    Filter(String),
    /// Items within the named collection
    InCollection(String),
    /// Items carrying the named tag
    InTag(String),
    /// Listing of collection names themselves
    Collections,
    /// Listing of tag names themselves
    Tags,
}

impl Scope {
    /// Parse the launcher's positional scope argument. The listing scopes
    /// ignore a group argument rather than silently becoming filters.
    pub fn parse(scope: &str, group: Option<&str>) -> Result<Self, SearchError> {
        match (scope, group) {
            ("general", _) => Ok(Scope::General),
            ("collections", _) => Ok(Scope::Collections),
            ("tags", _) => Ok(Scope::Tags),
            ("in-collection", Some(name)) => Ok(Scope::InCollection(name.to_string())),
            ("in-tag", Some(name)) => Ok(Scope::InTag(name.to_string())),
            ("in-collection", None) | ("in-tag", None) => Err(SearchError::UnknownScope(
                format!("{} requires a group name", scope),
            )),
            (other, _) => Ok(Scope::Filter(other.to_string())),
        }
    }
}

/// Which physical index file a plan targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableChoice {
    Unicode,
    AsciiFolded,
}

/// A planned query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryPlan {
    /// Full-text MATCH against the chosen table
    Match {
        table: TableChoice,
        expr: String,
    },
    /// Substring listing against the relational clone
    ListCollections(String),
    ListTags(String),
}

/// Plans concrete queries from scope + text
pub struct QueryPlanner<'a> {
    config: &'a SearchConfig,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    pub fn plan(&self, scope: &Scope, query: &str) -> Result<QueryPlan, SearchError> {
        let term = prefix_term(query);
        let table = route(query);
        match scope {
            Scope::General => Ok(QueryPlan::Match { table, expr: term }),
            Scope::Filter(name) => {
                let filter = self
                    .config
                    .filter(name)
                    .ok_or_else(|| SearchError::UnknownScope(name.clone()))?;
                // Disjunction over the filter's columns; key never takes
                // part in matching.
                let expr = filter
                    .columns
                    .iter()
                    .filter(|column| column.as_str() != "key")
                    .map(|column| format!("{}:{}", column, term))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                if expr.is_empty() {
                    return Err(SearchError::UnknownScope(name.clone()));
                }
                Ok(QueryPlan::Match { table, expr })
            }
            // Conjunction is implicit (whitespace) in FTS4 standard query
            // syntax; an explicit AND keyword is a malformed expression
            // there.
            Scope::InCollection(group) => Ok(QueryPlan::Match {
                table: route_group(query, group),
                expr: format!("{} collections:\"{}\"", term, group),
            }),
            Scope::InTag(group) => Ok(QueryPlan::Match {
                table: route_group(query, group),
                expr: format!("{} tags:\"{}\"", term, group),
            }),
            Scope::Collections => Ok(QueryPlan::ListCollections(query.trim().to_string())),
            Scope::Tags => Ok(QueryPlan::ListTags(query.trim().to_string())),
        }
    }
}

/// Trailing-wildcard prefix term for fuzzy matching
fn prefix_term(query: &str) -> String {
    format!("{}*", query.trim())
}

fn route(query: &str) -> TableChoice {
    if is_pure_ascii(query) {
        TableChoice::AsciiFolded
    } else {
        TableChoice::Unicode
    }
}

/// Within-group plans embed the group name in the expression, so routing
/// must consider it too.
fn route_group(query: &str, group: &str) -> TableChoice {
    if is_pure_ascii(query) && is_pure_ascii(group) {
        TableChoice::AsciiFolded
    } else {
        TableChoice::Unicode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    fn planner_plan(scope: &Scope, query: &str) -> QueryPlan {
        let config = SearchConfig::default();
        QueryPlanner::new(&config).plan(scope, query).unwrap()
    }

    #[test]
    fn test_general_is_unscoped_prefix_match() {
        let plan = planner_plan(&Scope::General, "epist");
        assert_eq!(
            plan,
            QueryPlan::Match {
                table: TableChoice::AsciiFolded,
                expr: "epist*".into()
            }
        );
    }

    #[test]
    fn test_filter_expands_to_column_disjunction() {
        let plan = planner_plan(&Scope::Filter("titles".into()), "epist");
        match plan {
            QueryPlan::Match { expr, .. } => {
                assert_eq!(expr, "title:epist* OR collection_title:epist*");
            }
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_in_collection_conjoins_group_specifier() {
        // Implicit conjunction: a bare space, not an AND keyword, which
        // FTS4 standard query syntax rejects.
        let plan = planner_plan(&Scope::InCollection("Deep History".into()), "epist");
        match plan {
            QueryPlan::Match { expr, .. } => {
                assert_eq!(expr, "epist* collections:\"Deep History\"");
            }
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_in_tag_conjoins_group_specifier() {
        let plan = planner_plan(&Scope::InTag("epistemology".into()), "infra");
        match plan {
            QueryPlan::Match { expr, .. } => {
                assert_eq!(expr, "infra* tags:\"epistemology\"");
                assert!(!expr.contains(" AND "));
            }
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_non_ascii_routes_to_unicode_table() {
        let plan = planner_plan(&Scope::General, "épist");
        assert_eq!(
            plan,
            QueryPlan::Match {
                table: TableChoice::Unicode,
                expr: "épist*".into()
            }
        );
    }

    #[test]
    fn test_non_ascii_group_routes_to_unicode_table() {
        let plan = planner_plan(&Scope::InTag("München".into()), "city");
        match plan {
            QueryPlan::Match { table, .. } => assert_eq!(table, TableChoice::Unicode),
            other => panic!("unexpected plan: {:?}", other),
        }
    }

    #[test]
    fn test_group_listing_is_relational() {
        let plan = planner_plan(&Scope::Collections, "hist");
        assert_eq!(plan, QueryPlan::ListCollections("hist".into()));
    }

    #[test]
    fn test_unknown_filter_is_an_error() {
        let config = SearchConfig::default();
        let err = QueryPlanner::new(&config)
            .plan(&Scope::Filter("nope".into()), "x")
            .unwrap_err();
        assert!(matches!(err, SearchError::UnknownScope(_)));
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse("general", None).unwrap(), Scope::General);
        assert_eq!(
            Scope::parse("in-tag", Some("history")).unwrap(),
            Scope::InTag("history".into())
        );
        assert!(Scope::parse("in-collection", None).is_err());
        assert_eq!(
            Scope::parse("titles", None).unwrap(),
            Scope::Filter("titles".into())
        );
    }

    #[test]
    fn test_listing_scopes_ignore_group_argument() {
        assert_eq!(Scope::parse("collections", None).unwrap(), Scope::Collections);
        assert_eq!(
            Scope::parse("collections", Some("x")).unwrap(),
            Scope::Collections
        );
        assert_eq!(Scope::parse("tags", Some("x")).unwrap(), Scope::Tags);
    }
}
