//! List hospitals query
//!
//! Paginated hospital listing with optional location, activity, and
//! embedded-inventory filters plus a free-text search. Deleted hospitals
//! are always excluded.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::filters::{Bind, Filters};
use crate::features::shared::pagination::{fetch_page, PageOptions, Paginated};
use crate::features::shared::validation::{validate_blood_type, validate_component};
use crate::models::Hospital;

/// Columns matched by the free-text query.
pub const HOSPITAL_SEARCH_COLUMNS: &[&str] = &["name", "address", "province", "district", "ward"];

const SELECT_SQL: &str = "SELECT id, name, address, province, district, ward, latitude, \
     longitude, blood_inventory, is_active, is_deleted, created_at, updated_at \
     FROM hospitals WHERE NOT is_deleted";
const COUNT_SQL: &str = "SELECT COUNT(*) FROM hospitals WHERE NOT is_deleted";

/// Query to list hospitals with pagination and filtering
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListHospitalsQuery {
    #[serde(flatten)]
    pub page: PageOptions,
    /// Free-text search over name/address/province/district/ward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Matches hospitals holding at least one snapshot entry of this type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

/// Errors that can occur when listing hospitals
#[derive(Debug, thiserror::Error)]
pub enum ListHospitalsError {
    #[error("Page must be greater than 0")]
    InvalidPage,

    #[error("Limit must be between 1 and 100")]
    InvalidLimit,

    #[error("{0}")]
    InvalidBloodType(String),

    #[error("{0}")]
    InvalidComponent(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<Hospital>, ListHospitalsError>> for ListHospitalsQuery {}

impl crate::cqrs::middleware::Query for ListHospitalsQuery {}

impl ListHospitalsQuery {
    pub fn validate(&self) -> Result<(), ListHospitalsError> {
        self.page.validate().map_err(|msg| match msg {
            "Page must be greater than 0" => ListHospitalsError::InvalidPage,
            _ => ListHospitalsError::InvalidLimit,
        })?;

        if let Some(ref blood_type) = self.blood_type {
            validate_blood_type(blood_type).map_err(ListHospitalsError::InvalidBloodType)?;
        }
        if let Some(ref component) = self.component {
            validate_component(component).map_err(ListHospitalsError::InvalidComponent)?;
        }

        Ok(())
    }

    /// Compose the filter set; absent predicates contribute nothing.
    pub fn filters(&self) -> Filters {
        Filters::new()
            .contains_opt("province", self.province.as_deref())
            .contains_opt("district", self.district.as_deref())
            .contains_opt("ward", self.ward.as_deref())
            .eq_opt("is_active", self.is_active.map(Bind::Bool))
            .snapshot_eq_opt("blood_inventory", "blood_type", self.blood_type.as_deref())
            .snapshot_eq_opt("blood_inventory", "component", self.component.as_deref())
    }
}

/// Handles the list hospitals query
///
/// Ordered by creation date (descending unless overridden). The free-text
/// `search` parameter feeds the shared pagination search-OR clause.
#[tracing::instrument(skip(pool, query), fields(page = ?query.page.page, limit = ?query.page.limit))]
pub async fn handle(
    pool: PgPool,
    query: ListHospitalsQuery,
) -> Result<Paginated<Hospital>, ListHospitalsError> {
    query.validate()?;

    let mut opts = query.page.clone();
    if opts.q.is_none() {
        opts.q = query.search.clone();
    }

    let page = fetch_page::<Hospital>(
        &pool,
        SELECT_SQL,
        COUNT_SQL,
        &query.filters(),
        HOSPITAL_SEARCH_COLUMNS,
        "created_at",
        &opts,
    )
    .await?;

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{Postgres, QueryBuilder};

    fn render(filters: &Filters) -> String {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(COUNT_SQL);
        filters.apply(&mut qb);
        qb.into_sql()
    }

    #[test]
    fn test_validation_success() {
        let query = ListHospitalsQuery {
            blood_type: Some("O-".to_string()),
            component: Some("plasma".to_string()),
            ..Default::default()
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_page() {
        let query = ListHospitalsQuery {
            page: PageOptions::new(Some(0), Some(20)),
            ..Default::default()
        };
        assert!(matches!(
            query.validate(),
            Err(ListHospitalsError::InvalidPage)
        ));
    }

    #[test]
    fn test_validation_invalid_blood_type() {
        let query = ListHospitalsQuery {
            blood_type: Some("Z+".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.validate(),
            Err(ListHospitalsError::InvalidBloodType(_))
        ));
    }

    #[test]
    fn test_empty_query_filters_nothing_beyond_soft_delete() {
        let query = ListHospitalsQuery::default();
        assert_eq!(render(&query.filters()), COUNT_SQL);
    }

    #[test]
    fn test_location_filters_render_substring_matches() {
        let query = ListHospitalsQuery {
            province: Some("Ha Noi".to_string()),
            ward: Some("Dich Vong".to_string()),
            ..Default::default()
        };

        assert_eq!(
            render(&query.filters()),
            format!("{COUNT_SQL} AND province ILIKE $1 AND ward ILIKE $2")
        );
    }

    #[test]
    fn test_inventory_filters_match_embedded_entries() {
        let query = ListHospitalsQuery {
            blood_type: Some("A+".to_string()),
            ..Default::default()
        };

        let sql = render(&query.filters());
        assert!(sql.contains("jsonb_array_elements(blood_inventory)"));
        assert!(sql.contains("entry->>'blood_type' = $1"));
    }
}
