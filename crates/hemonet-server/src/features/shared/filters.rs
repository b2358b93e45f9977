//! Filter composition for list queries
//!
//! [`Filters`] collects independently-optional predicates and renders them
//! as `AND`-joined SQL conditions with bound parameters. A predicate whose
//! value was not supplied is never added, so an absent filter contributes
//! nothing to the query - there is no wildcard fallback.
//!
//! Callers start their statement with an explicit `WHERE` clause (usually
//! `WHERE 1=1` or a fixed condition like `WHERE NOT is_deleted`) and then
//! apply a filter set on top.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// A bound predicate value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

fn push_bind(qb: &mut QueryBuilder<'_, Postgres>, value: &Bind) {
    match value {
        Bind::Text(v) => qb.push_bind(v.clone()),
        Bind::Int(v) => qb.push_bind(*v),
        Bind::Bool(v) => qb.push_bind(*v),
        Bind::Uuid(v) => qb.push_bind(*v),
        Bind::Timestamp(v) => qb.push_bind(*v),
    };
}

/// Escape LIKE metacharacters so user input only matches literally.
pub fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// `column = value`
    Eq { column: &'static str, value: Bind },
    /// case-insensitive substring match on `column`
    Contains {
        column: &'static str,
        needle: String,
    },
    /// `column >= value` (inclusive lower bound)
    Min { column: &'static str, value: Bind },
    /// `column <= value` (inclusive upper bound)
    Max { column: &'static str, value: Bind },
    /// an embedded snapshot entry has `key = value`
    SnapshotEq {
        array_column: &'static str,
        key: &'static str,
        value: String,
    },
    /// free-text query OR-matched across columns
    Search {
        columns: Vec<&'static str>,
        needle: String,
    },
}

/// Composable WHERE-clause fragment builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    predicates: Vec<Predicate>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Exact match on a column.
    pub fn eq(mut self, column: &'static str, value: Bind) -> Self {
        self.predicates.push(Predicate::Eq { column, value });
        self
    }

    /// Exact match, skipped entirely when the value is absent.
    pub fn eq_opt(self, column: &'static str, value: Option<Bind>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    /// Case-insensitive substring match, skipped when absent.
    pub fn contains_opt(mut self, column: &'static str, needle: Option<&str>) -> Self {
        if let Some(needle) = needle {
            self.predicates.push(Predicate::Contains {
                column,
                needle: needle.to_string(),
            });
        }
        self
    }

    /// Inclusive lower bound, skipped when absent.
    pub fn min_opt(mut self, column: &'static str, value: Option<Bind>) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::Min { column, value });
        }
        self
    }

    /// Inclusive upper bound, skipped when absent.
    pub fn max_opt(mut self, column: &'static str, value: Option<Bind>) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::Max { column, value });
        }
        self
    }

    /// Match rows whose embedded JSONB array contains an entry with
    /// `key = value`. Skipped when absent.
    pub fn snapshot_eq_opt(
        mut self,
        array_column: &'static str,
        key: &'static str,
        value: Option<&str>,
    ) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::SnapshotEq {
                array_column,
                key,
                value: value.to_string(),
            });
        }
        self
    }

    /// Free-text query OR-matched (case-insensitive substring) across the
    /// given columns. Skipped when the needle is absent or no columns are
    /// given.
    pub fn search(mut self, needle: Option<&str>, columns: &[&'static str]) -> Self {
        if let Some(needle) = needle {
            if !columns.is_empty() && !needle.is_empty() {
                self.predicates.push(Predicate::Search {
                    columns: columns.to_vec(),
                    needle: needle.to_string(),
                });
            }
        }
        self
    }

    /// Append every collected predicate to `qb` as an `AND ...` condition.
    pub fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for predicate in &self.predicates {
            match predicate {
                Predicate::Eq { column, value } => {
                    qb.push(" AND ");
                    qb.push(*column);
                    qb.push(" = ");
                    push_bind(qb, value);
                }
                Predicate::Contains { column, needle } => {
                    qb.push(" AND ");
                    qb.push(*column);
                    qb.push(" ILIKE ");
                    qb.push_bind(format!("%{}%", escape_like(needle)));
                }
                Predicate::Min { column, value } => {
                    qb.push(" AND ");
                    qb.push(*column);
                    qb.push(" >= ");
                    push_bind(qb, value);
                }
                Predicate::Max { column, value } => {
                    qb.push(" AND ");
                    qb.push(*column);
                    qb.push(" <= ");
                    push_bind(qb, value);
                }
                Predicate::SnapshotEq {
                    array_column,
                    key,
                    value,
                } => {
                    qb.push(" AND EXISTS (SELECT 1 FROM jsonb_array_elements(");
                    qb.push(*array_column);
                    qb.push(") AS entry WHERE entry->>'");
                    qb.push(*key);
                    qb.push("' = ");
                    qb.push_bind(value.clone());
                    qb.push(")");
                }
                Predicate::Search { columns, needle } => {
                    let pattern = format!("%{}%", escape_like(needle));
                    qb.push(" AND (");
                    for (i, column) in columns.iter().enumerate() {
                        if i > 0 {
                            qb.push(" OR ");
                        }
                        qb.push(*column);
                        qb.push(" ILIKE ");
                        qb.push_bind(pattern.clone());
                    }
                    qb.push(")");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filters: &Filters) -> String {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("WHERE 1=1");
        filters.apply(&mut qb);
        qb.into_sql()
    }

    #[test]
    fn test_empty_filters_render_nothing() {
        assert_eq!(render(&Filters::new()), "WHERE 1=1");
    }

    #[test]
    fn test_absent_values_are_omitted() {
        let filters = Filters::new()
            .eq_opt("blood_type", None)
            .contains_opt("province", None)
            .min_opt("quantity", None)
            .max_opt("quantity", None)
            .snapshot_eq_opt("blood_inventory", "component", None)
            .search(None, &["name", "address"]);

        assert!(filters.is_empty());
        assert_eq!(render(&filters), "WHERE 1=1");
    }

    #[test]
    fn test_eq_renders_bound_condition() {
        let filters = Filters::new().eq("blood_type", Bind::Text("O+".to_string()));
        assert_eq!(render(&filters), "WHERE 1=1 AND blood_type = $1");
    }

    #[test]
    fn test_contains_renders_ilike() {
        let filters = Filters::new().contains_opt("province", Some("Ha"));
        assert_eq!(render(&filters), "WHERE 1=1 AND province ILIKE $1");
    }

    #[test]
    fn test_range_bounds_are_inclusive_and_independent() {
        let min_only = Filters::new().min_opt("quantity", Some(Bind::Int(2)));
        assert_eq!(render(&min_only), "WHERE 1=1 AND quantity >= $1");

        let both = Filters::new()
            .min_opt("quantity", Some(Bind::Int(2)))
            .max_opt("quantity", Some(Bind::Int(10)));
        assert_eq!(
            render(&both),
            "WHERE 1=1 AND quantity >= $1 AND quantity <= $2"
        );
    }

    #[test]
    fn test_snapshot_eq_renders_exists_over_entries() {
        let filters =
            Filters::new().snapshot_eq_opt("blood_inventory", "blood_type", Some("A+"));
        assert_eq!(
            render(&filters),
            "WHERE 1=1 AND EXISTS (SELECT 1 FROM jsonb_array_elements(blood_inventory) \
             AS entry WHERE entry->>'blood_type' = $1)"
        );
    }

    #[test]
    fn test_search_renders_or_group() {
        let filters = Filters::new().search(Some("central"), &["name", "address", "ward"]);
        assert_eq!(
            render(&filters),
            "WHERE 1=1 AND (name ILIKE $1 OR address ILIKE $2 OR ward ILIKE $3)"
        );
    }

    #[test]
    fn test_search_without_columns_is_skipped() {
        let filters = Filters::new().search(Some("central"), &[]);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_predicates_compose_in_order() {
        let filters = Filters::new()
            .eq("component", Bind::Text("plasma".to_string()))
            .contains_opt("district", Some("Cau"))
            .search(Some("blood"), &["name"]);

        assert_eq!(
            render(&filters),
            "WHERE 1=1 AND component = $1 AND district ILIKE $2 AND (name ILIKE $3)"
        );
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("50%_done\\"), "50\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
