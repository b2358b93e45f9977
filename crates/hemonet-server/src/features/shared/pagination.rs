//! Shared pagination utilities
//!
//! Offset pagination reusable across entity collections: request options,
//! computed page metadata, and a generic count-plus-page fetch that layers a
//! filter set and an optional free-text search over any table.
//!
//! The count and the page fetch are two separate queries using the identical
//! filter; under concurrent writes they may observe different states, and a
//! resulting metadata/page mismatch is accepted rather than corrected.

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};

use super::filters::Filters;

/// Default number of records per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Maximum number of records per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Common pagination request options
///
/// Used in list queries to specify page, page size, free-text query, and
/// sort direction. Provides sensible defaults (page 1, 10 items, newest
/// first).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PageOptions {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 10, clamped to 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Free-text query, OR-matched across the caller's search fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Sort direction for the caller's sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl PageOptions {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page,
            limit,
            q: None,
            order: None,
        }
    }

    /// Get the page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page, defaulting to 10 and clamped to 1-100
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    /// Calculate the offset for a SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Get the sort direction, defaulting to descending
    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }

    /// Validate pagination options
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(page) = self.page {
            if page < 1 {
                return Err("Page must be greater than 0");
            }
        }
        if let Some(limit) = self.limit {
            if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
                return Err("Limit must be between 1 and 100");
            }
        }
        Ok(())
    }
}

/// Pagination metadata for a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number (1-indexed)
    pub current_page: i64,

    /// Items per page
    pub limit: i64,

    /// Total number of matching records
    pub total_records: i64,

    /// Total number of pages
    pub total_pages: i64,

    /// Whether there is a page before this one
    pub has_previous_page: bool,

    /// Whether there is a page after this one
    pub has_next_page: bool,
}

impl PageMeta {
    /// Compute metadata from the current page, page size, and total count
    pub fn new(current_page: i64, limit: i64, total_records: i64) -> Self {
        let total_pages = if total_records == 0 {
            0
        } else {
            ((total_records as f64) / (limit as f64)).ceil() as i64
        };

        Self {
            current_page,
            limit,
            total_records,
            total_pages,
            has_previous_page: current_page > 1,
            has_next_page: current_page < total_pages,
        }
    }

    /// Compute metadata from request options and a total count
    pub fn from_options(opts: &PageOptions, total_records: i64) -> Self {
        Self::new(opts.page(), opts.limit(), total_records)
    }
}

/// Wrapper for paginated list responses
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Records for the current page
    pub items: Vec<T>,

    /// Pagination metadata
    pub pagination: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pagination: PageMeta) -> Self {
        Self { items, pagination }
    }

    /// Map items to a different type
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Slice an already-materialized, already-sorted result set into one page.
///
/// Used by queries that must materialize a joined result before paginating;
/// the total is taken from the same set the page is cut from.
pub fn paginate_materialized<T>(rows: Vec<T>, opts: &PageOptions) -> Paginated<T> {
    let total = rows.len() as i64;
    let offset = opts.offset().min(total) as usize;
    let end = (offset + opts.limit() as usize).min(rows.len());

    let items = rows.into_iter().skip(offset).take(end - offset).collect();

    Paginated::new(items, PageMeta::from_options(opts, total))
}

/// Run the count and page queries for one filtered, searchable statement.
///
/// `select_sql` and `count_sql` must each end in an open `WHERE` clause
/// (e.g. `... WHERE 1=1`); the filter set and the search-OR derived from
/// `opts.q` are appended to both, so the count always matches the page
/// filter. `sort_column` comes from the caller, never from user input.
pub async fn fetch_page<T>(
    pool: &PgPool,
    select_sql: &str,
    count_sql: &str,
    filters: &Filters,
    search_columns: &[&'static str],
    sort_column: &'static str,
    opts: &PageOptions,
) -> Result<Paginated<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let filters = filters.clone().search(opts.q.as_deref(), search_columns);

    let mut count_query: QueryBuilder<'_, Postgres> = QueryBuilder::new(count_sql);
    filters.apply(&mut count_query);
    let total_records: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut page_query: QueryBuilder<'_, Postgres> = QueryBuilder::new(select_sql);
    filters.apply(&mut page_query);
    page_query.push(" ORDER BY ");
    page_query.push(sort_column);
    page_query.push(" ");
    page_query.push(opts.order().as_sql());
    page_query.push(" LIMIT ");
    page_query.push_bind(opts.limit());
    page_query.push(" OFFSET ");
    page_query.push_bind(opts.offset());

    let items = page_query.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Paginated::new(items, PageMeta::from_options(opts, total_records)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_options_defaults() {
        let opts = PageOptions::default();
        assert_eq!(opts.page(), 1);
        assert_eq!(opts.limit(), 10);
        assert_eq!(opts.offset(), 0);
        assert_eq!(opts.order(), SortOrder::Desc);
    }

    #[test]
    fn test_page_options_custom() {
        let opts = PageOptions::new(Some(3), Some(50));
        assert_eq!(opts.page(), 3);
        assert_eq!(opts.limit(), 50);
        assert_eq!(opts.offset(), 100);
    }

    #[test]
    fn test_page_options_clamping() {
        let opts = PageOptions::new(Some(-1), Some(200));
        assert_eq!(opts.page(), 1);
        assert_eq!(opts.limit(), 100);
    }

    #[test]
    fn test_page_options_validation() {
        assert!(PageOptions::new(Some(1), Some(50)).validate().is_ok());
        assert_eq!(
            PageOptions::new(Some(0), Some(20)).validate(),
            Err("Page must be greater than 0")
        );
        assert_eq!(
            PageOptions::new(Some(1), Some(101)).validate(),
            Err("Limit must be between 1 and 100")
        );
    }

    #[test]
    fn test_page_meta() {
        let meta = PageMeta::new(2, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_previous_page);
        assert!(meta.has_next_page);
    }

    #[test]
    fn test_page_meta_empty() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_previous_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn test_page_meta_last_page() {
        let meta = PageMeta::new(3, 10, 25);
        assert!(meta.has_previous_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn test_page_meta_exact_multiple() {
        let meta = PageMeta::new(2, 10, 20);
        assert_eq!(meta.total_pages, 2);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn test_paginate_materialized_middle_page() {
        let rows: Vec<i64> = (1..=25).collect();
        let opts = PageOptions::new(Some(2), Some(10));

        let page = paginate_materialized(rows, &opts);
        assert_eq!(page.items, (11..=20).collect::<Vec<i64>>());
        assert_eq!(page.pagination.total_records, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next_page);
    }

    #[test]
    fn test_paginate_materialized_beyond_last_page() {
        let rows: Vec<i64> = (1..=5).collect();
        let opts = PageOptions::new(Some(4), Some(10));

        let page = paginate_materialized(rows, &opts);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_records, 5);
        assert!(page.pagination.has_previous_page);
        assert!(!page.pagination.has_next_page);
    }

    #[test]
    fn test_paginated_map() {
        let paginated = Paginated::new(vec![1, 2, 3], PageMeta::new(1, 10, 3));
        let mapped = paginated.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.pagination.total_records, 3);
    }

    proptest! {
        #[test]
        fn prop_total_pages_is_ceiling_division(
            current_page in 1i64..10_000,
            limit in 1i64..1_000,
            total in 0i64..1_000_000,
        ) {
            let meta = PageMeta::new(current_page, limit, total);

            let expected_pages = (total + limit - 1) / limit;
            prop_assert_eq!(meta.total_pages, expected_pages);
            prop_assert_eq!(meta.has_next_page, current_page < expected_pages);
            prop_assert_eq!(meta.has_previous_page, current_page > 1);
        }
    }
}
