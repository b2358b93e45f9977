//! Delete hospital command
//!
//! Soft-deletes a hospital and cascades one hop to its staff records.
//! Blood units are left in place; the hospital (and with it the snapshot)
//! simply becomes unreachable through normal queries.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::hospitals;
use crate::features::shared::validation::{validate_identifier, IdentifierError};

/// Command to soft-delete a hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteHospitalCommand {
    pub id: String,
}

/// Response from deleting a hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteHospitalResponse {
    pub id: Uuid,
    pub deleted: bool,
    /// Staff records deactivated by the one-hop cascade.
    pub staff_removed: u64,
}

/// Errors that can occur when deleting a hospital
#[derive(Debug, thiserror::Error)]
pub enum DeleteHospitalError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Hospital '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteHospitalResponse, DeleteHospitalError>> for DeleteHospitalCommand {}

impl crate::cqrs::middleware::Command for DeleteHospitalCommand {}

/// Handles the delete hospital command
#[tracing::instrument(skip(pool), fields(id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteHospitalCommand,
) -> Result<DeleteHospitalResponse, DeleteHospitalError> {
    let id = validate_identifier(&command.id)?;

    let mut tx = pool.begin().await?;

    if !hospitals::soft_delete(&mut *tx, id).await? {
        return Err(DeleteHospitalError::NotFound(id));
    }

    let staff_removed = hospitals::soft_delete_staff(&mut *tx, id).await?;

    tx.commit().await?;

    tracing::info!(hospital_id = %id, staff_removed, "Hospital soft-deleted");

    Ok(DeleteHospitalResponse {
        id,
        deleted: true,
        staff_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_id_fails_before_any_query() {
        assert!(matches!(
            validate_identifier("definitely-not-a-uuid"),
            Err(IdentifierError::Malformed(_))
        ));
    }
}
