//! List blood units by hospital query
//!
//! Reads the authoritative store for one hospital, newest first. This is
//! the store-side counterpart of the hospital's snapshot read.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{blood_units, hospitals};
use crate::features::shared::validation::{validate_identifier, IdentifierError};
use crate::models::BloodUnit;

/// Query to list one hospital's blood units from the authoritative store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListByHospitalQuery {
    pub hospital_id: String,
}

/// Errors that can occur when listing a hospital's units
#[derive(Debug, thiserror::Error)]
pub enum ListByHospitalError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Hospital '{0}' not found")]
    HospitalNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<BloodUnit>, ListByHospitalError>> for ListByHospitalQuery {}

impl crate::cqrs::middleware::Query for ListByHospitalQuery {}

#[tracing::instrument(skip(pool), fields(hospital_id = %query.hospital_id))]
pub async fn handle(
    pool: PgPool,
    query: ListByHospitalQuery,
) -> Result<Vec<BloodUnit>, ListByHospitalError> {
    let hospital_id = validate_identifier(&query.hospital_id)?;

    if !hospitals::exists_live(&pool, hospital_id).await? {
        return Err(ListByHospitalError::HospitalNotFound(hospital_id));
    }

    Ok(blood_units::find_by_hospital(&pool, hospital_id).await?)
}
