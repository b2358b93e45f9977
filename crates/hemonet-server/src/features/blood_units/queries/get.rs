//! Get blood unit query
//!
//! Fetches one unit with its hospital's display fields joined in.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::blood_units::types::{BloodUnitView, JoinedUnitRow, UNIT_SELECT_JOINED};
use crate::features::shared::validation::{validate_identifier, IdentifierError};

/// Query to fetch one blood unit by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBloodUnitQuery {
    pub id: String,
}

/// Errors that can occur when fetching a blood unit
#[derive(Debug, thiserror::Error)]
pub enum GetBloodUnitError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Blood unit '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<BloodUnitView, GetBloodUnitError>> for GetBloodUnitQuery {}

impl crate::cqrs::middleware::Query for GetBloodUnitQuery {}

#[tracing::instrument(skip(pool), fields(id = %query.id))]
pub async fn handle(
    pool: PgPool,
    query: GetBloodUnitQuery,
) -> Result<BloodUnitView, GetBloodUnitError> {
    let id = validate_identifier(&query.id)?;

    let sql = format!("{UNIT_SELECT_JOINED} AND bu.id = $1");

    let row = sqlx::query_as::<_, JoinedUnitRow>(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(GetBloodUnitError::NotFound(id))?;

    Ok(BloodUnitView::from(row))
}
