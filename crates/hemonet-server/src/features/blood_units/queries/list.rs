//! List blood units query
//!
//! Paginated unit listing with two execution strategies, chosen by which
//! predicates are populated:
//!
//! - **Direct**: only unit-level predicates (type, component, hospital id,
//!   quantity and date windows). Count plus an indexed LIMIT/OFFSET page.
//! - **Join**: any hospital-location predicate (province, district, ward,
//!   address) is present. Location fields live on the hospitals side of the
//!   join, so the filtered, sorted join result is materialized in full, the
//!   total taken from it, and the page sliced out of it. Proportionally
//!   more expensive, but correct for cross-entity filtering.
//!
//! Callers see one interface; the strategy is internal.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::features::blood_units::types::{
    BloodUnitView, JoinedUnitRow, UNIT_COUNT_JOINED, UNIT_SELECT_JOINED,
};
use crate::features::shared::filters::{Bind, Filters};
use crate::features::shared::pagination::{
    fetch_page, paginate_materialized, PageOptions, Paginated,
};
use crate::features::shared::validation::{
    validate_blood_type, validate_component, validate_identifier, IdentifierError,
};

/// Query to list blood units with pagination and filtering
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListBloodUnitsQuery {
    #[serde(flatten)]
    pub page: PageOptions,

    // Unit-level predicates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_before: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_before: Option<DateTime<Utc>>,

    // Hospital-location predicates; any of these forces the join strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Errors that can occur when listing blood units
#[derive(Debug, thiserror::Error)]
pub enum ListBloodUnitsError {
    #[error("Page must be greater than 0")]
    InvalidPage,

    #[error("Limit must be between 1 and 100")]
    InvalidLimit,

    #[error("{0}")]
    InvalidBloodType(String),

    #[error("{0}")]
    InvalidComponent(String),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<BloodUnitView>, ListBloodUnitsError>> for ListBloodUnitsQuery {}

impl crate::cqrs::middleware::Query for ListBloodUnitsQuery {}

impl ListBloodUnitsQuery {
    /// Validate, returning the parsed hospital filter when present.
    pub fn validate(&self) -> Result<Option<Uuid>, ListBloodUnitsError> {
        self.page.validate().map_err(|msg| match msg {
            "Page must be greater than 0" => ListBloodUnitsError::InvalidPage,
            _ => ListBloodUnitsError::InvalidLimit,
        })?;

        if let Some(ref blood_type) = self.blood_type {
            validate_blood_type(blood_type).map_err(ListBloodUnitsError::InvalidBloodType)?;
        }
        if let Some(ref component) = self.component {
            validate_component(component).map_err(ListBloodUnitsError::InvalidComponent)?;
        }

        match self.hospital_id {
            Some(ref raw) => Ok(Some(validate_identifier(raw)?)),
            None => Ok(None),
        }
    }

    /// True when any predicate lives on the hospitals side of the join.
    pub fn has_location_predicates(&self) -> bool {
        self.province.is_some()
            || self.district.is_some()
            || self.ward.is_some()
            || self.address.is_some()
    }

    /// Predicates on the unit columns alone.
    pub fn unit_filters(&self, hospital_id: Option<Uuid>) -> Filters {
        Filters::new()
            .eq_opt(
                "bu.blood_type",
                self.blood_type.clone().map(Bind::Text),
            )
            .eq_opt("bu.component", self.component.clone().map(Bind::Text))
            .eq_opt("bu.hospital_id", hospital_id.map(Bind::Uuid))
            .min_opt("bu.quantity", self.quantity_min.map(|v| Bind::Int(v as i64)))
            .max_opt("bu.quantity", self.quantity_max.map(|v| Bind::Int(v as i64)))
            .min_opt("bu.expires_at", self.expires_after.map(Bind::Timestamp))
            .max_opt("bu.expires_at", self.expires_before.map(Bind::Timestamp))
            .min_opt("bu.created_at", self.created_after.map(Bind::Timestamp))
            .max_opt("bu.created_at", self.created_before.map(Bind::Timestamp))
            .min_opt("bu.updated_at", self.updated_after.map(Bind::Timestamp))
            .max_opt("bu.updated_at", self.updated_before.map(Bind::Timestamp))
    }

    /// Unit predicates plus the joined hospital-location predicates.
    pub fn joined_filters(&self, hospital_id: Option<Uuid>) -> Filters {
        self.unit_filters(hospital_id)
            .contains_opt("h.province", self.province.as_deref())
            .contains_opt("h.district", self.district.as_deref())
            .contains_opt("h.ward", self.ward.as_deref())
            .contains_opt("h.address", self.address.as_deref())
    }
}

/// Handles the list blood units query
#[tracing::instrument(skip(pool, query), fields(page = ?query.page.page, limit = ?query.page.limit))]
pub async fn handle(
    pool: PgPool,
    query: ListBloodUnitsQuery,
) -> Result<Paginated<BloodUnitView>, ListBloodUnitsError> {
    let hospital_id = query.validate()?;

    if query.has_location_predicates() {
        // Joined-field filtering can't run as a plain unit filter, and
        // LIMIT/OFFSET over the join is not trusted here; materialize the
        // sorted result and slice the page out of it.
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(UNIT_SELECT_JOINED);
        query.joined_filters(hospital_id).apply(&mut qb);
        qb.push(" ORDER BY bu.created_at ");
        qb.push(query.page.order().as_sql());

        let rows = qb.build_query_as::<JoinedUnitRow>().fetch_all(&pool).await?;

        return Ok(paginate_materialized(rows, &query.page).map(BloodUnitView::from));
    }

    let page = fetch_page::<JoinedUnitRow>(
        &pool,
        UNIT_SELECT_JOINED,
        UNIT_COUNT_JOINED,
        &query.unit_filters(hospital_id),
        &[],
        "bu.created_at",
        &query.page,
    )
    .await?;

    Ok(page.map(BloodUnitView::from))
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
    fn test_strategy_direct_without_location_predicates() {
        let query = ListBloodUnitsQuery {
            blood_type: Some("O+".to_string()),
            quantity_min: Some(1),
            ..Default::default()
        };
        assert!(!query.has_location_predicates());
    }

    #[test]
    fn test_strategy_join_with_any_location_predicate() {
        for field in ["province", "district", "ward", "address"] {
            let mut query = ListBloodUnitsQuery::default();
            match field {
                "province" => query.province = Some("Ha Noi".to_string()),
                "district" => query.district = Some("Cau Giay".to_string()),
                "ward" => query.ward = Some("Dich Vong".to_string()),
                _ => query.address = Some("Nguyen Trai".to_string()),
            }
            assert!(query.has_location_predicates(), "{field} must force the join");
        }
    }

    #[test]
    fn test_unit_filters_render_qualified_columns() {
        let hospital_id = Uuid::new_v4();
        let query = ListBloodUnitsQuery {
            blood_type: Some("AB-".to_string()),
            quantity_min: Some(2),
            quantity_max: Some(8),
            ..Default::default()
        };

        assert_eq!(
            render(&query.unit_filters(Some(hospital_id))),
            "WHERE 1=1 AND bu.blood_type = $1 AND bu.hospital_id = $2 \
             AND bu.quantity >= $3 AND bu.quantity <= $4"
        );
    }

    #[test]
    fn test_joined_filters_add_location_conditions() {
        let query = ListBloodUnitsQuery {
            component: Some("plasma".to_string()),
            province: Some("Ha Noi".to_string()),
            address: Some("Nguyen".to_string()),
            ..Default::default()
        };

        assert_eq!(
            render(&query.joined_filters(None)),
            "WHERE 1=1 AND bu.component = $1 AND h.province ILIKE $2 AND h.address ILIKE $3"
        );
    }

    #[test]
    fn test_date_windows_are_independent() {
        let after = Utc::now();
        let query = ListBloodUnitsQuery {
            expires_after: Some(after),
            ..Default::default()
        };

        assert_eq!(
            render(&query.unit_filters(None)),
            "WHERE 1=1 AND bu.expires_at >= $1"
        );
    }

    #[test]
    fn test_validation_rejects_bad_hospital_id() {
        let query = ListBloodUnitsQuery {
            hospital_id: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.validate(),
            Err(ListBloodUnitsError::Identifier(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_page() {
        let query = ListBloodUnitsQuery {
            page: PageOptions::new(Some(-3), None),
            ..Default::default()
        };
        assert!(matches!(
            query.validate(),
            Err(ListBloodUnitsError::InvalidPage)
        ));
    }
}
