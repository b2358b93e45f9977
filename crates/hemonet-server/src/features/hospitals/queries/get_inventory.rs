//! Get hospital inventory query
//!
//! Reads the denormalized snapshot array; the authoritative store is not
//! consulted on this path.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::hospitals;
use crate::features::shared::validation::{validate_identifier, IdentifierError};
use crate::models::InventoryEntry;

/// Query to fetch a hospital's embedded inventory snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetHospitalInventoryQuery {
    pub hospital_id: String,
}

/// Errors that can occur when fetching a hospital's inventory
#[derive(Debug, thiserror::Error)]
pub enum GetHospitalInventoryError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Hospital '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<InventoryEntry>, GetHospitalInventoryError>>
    for GetHospitalInventoryQuery
{
}

impl crate::cqrs::middleware::Query for GetHospitalInventoryQuery {}

#[tracing::instrument(skip(pool), fields(hospital_id = %query.hospital_id))]
pub async fn handle(
    pool: PgPool,
    query: GetHospitalInventoryQuery,
) -> Result<Vec<InventoryEntry>, GetHospitalInventoryError> {
    let id = validate_identifier(&query.hospital_id)?;

    let hospital = hospitals::find_live_by_id(&pool, id)
        .await?
        .ok_or(GetHospitalInventoryError::NotFound(id))?;

    Ok(hospital.blood_inventory.0)
}
