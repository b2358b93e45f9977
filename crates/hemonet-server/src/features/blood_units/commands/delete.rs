//! Delete blood unit command
//!
//! Removes one unit from the authoritative store, then pulls its entry
//! from the owning hospital's snapshot array.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{blood_units, snapshots};
use crate::features::shared::validation::{validate_identifier, IdentifierError};

/// Command to delete a blood unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBloodUnitCommand {
    pub id: String,
}

/// Response from deleting a blood unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBloodUnitResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Errors that can occur when deleting a blood unit
#[derive(Debug, thiserror::Error)]
pub enum DeleteBloodUnitError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Blood unit '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteBloodUnitResponse, DeleteBloodUnitError>> for DeleteBloodUnitCommand {}

impl crate::cqrs::middleware::Command for DeleteBloodUnitCommand {}

/// Handles the delete blood unit command
#[tracing::instrument(skip(pool), fields(id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteBloodUnitCommand,
) -> Result<DeleteBloodUnitResponse, DeleteBloodUnitError> {
    let id = validate_identifier(&command.id)?;

    let deleted = blood_units::delete_by_id(&pool, id)
        .await?
        .ok_or(DeleteBloodUnitError::NotFound(id))?;

    if let Err(e) = snapshots::pull_entry(&pool, deleted.hospital_id, id).await {
        snapshots::log_sync_failure(deleted.hospital_id, "pull_entry", &e);
    }

    tracing::info!(unit_id = %id, hospital_id = %deleted.hospital_id, "Blood unit deleted");

    Ok(DeleteBloodUnitResponse { id, deleted: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id_is_rejected() {
        assert!(matches!(
            validate_identifier(""),
            Err(IdentifierError::Required)
        ));
    }
}
