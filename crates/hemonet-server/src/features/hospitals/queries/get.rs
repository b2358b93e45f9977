//! Get hospital query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::hospitals;
use crate::features::shared::validation::{validate_identifier, IdentifierError};
use crate::models::Hospital;

/// Query to fetch one non-deleted hospital by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHospitalQuery {
    pub id: String,
}

/// Errors that can occur when fetching a hospital
#[derive(Debug, thiserror::Error)]
pub enum GetHospitalError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Hospital '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Hospital, GetHospitalError>> for GetHospitalQuery {}

impl crate::cqrs::middleware::Query for GetHospitalQuery {}

#[tracing::instrument(skip(pool), fields(id = %query.id))]
pub async fn handle(pool: PgPool, query: GetHospitalQuery) -> Result<Hospital, GetHospitalError> {
    let id = validate_identifier(&query.id)?;

    hospitals::find_live_by_id(&pool, id)
        .await?
        .ok_or(GetHospitalError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_id_is_rejected() {
        assert!(matches!(
            validate_identifier("123-not-a-uuid"),
            Err(IdentifierError::Malformed(_))
        ));
    }
}
