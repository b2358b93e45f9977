//! Add inventory item command
//!
//! Adds a single blood unit to a hospital. The unit is inserted into the
//! authoritative store first so it has a stable identifier, then its entry
//! is appended to the hospital's snapshot array. The append is safe under
//! concurrent writers; it never reads the prior array state.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{blood_units, hospitals, snapshots};
use crate::features::hospitals::types::{InventoryItemError, InventoryItemInput};
use crate::features::shared::validation::{validate_identifier, IdentifierError};
use crate::models::InventoryEntry;

/// Command to add one blood unit to a hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddInventoryCommand {
    /// Set from the request path, not the body.
    #[serde(default)]
    pub hospital_id: String,
    pub item: InventoryItemInput,
}

/// Errors that can occur when adding an inventory item
#[derive(Debug, thiserror::Error)]
pub enum AddInventoryError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Invalid inventory item: {0}")]
    Inventory(#[from] InventoryItemError),

    #[error("Hospital '{0}' not found")]
    HospitalNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<InventoryEntry, AddInventoryError>> for AddInventoryCommand {}

impl crate::cqrs::middleware::Command for AddInventoryCommand {}

impl AddInventoryCommand {
    pub fn validate_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, blood_units::NewBloodUnit), AddInventoryError> {
        let hospital_id = validate_identifier(&self.hospital_id)?;
        let unit = self.item.validate_at(now)?;
        Ok((hospital_id, unit))
    }

    pub fn validate(&self) -> Result<(Uuid, blood_units::NewBloodUnit), AddInventoryError> {
        self.validate_at(Utc::now())
    }
}

/// Handles the add inventory command
#[tracing::instrument(skip(pool, command), fields(hospital_id = %command.hospital_id))]
pub async fn handle(
    pool: PgPool,
    command: AddInventoryCommand,
) -> Result<InventoryEntry, AddInventoryError> {
    let (hospital_id, new_unit) = command.validate()?;

    if !hospitals::exists_live(&pool, hospital_id).await? {
        return Err(AddInventoryError::HospitalNotFound(hospital_id));
    }

    let unit = blood_units::insert_one(&pool, hospital_id, &new_unit).await?;
    let entry = InventoryEntry::from(&unit);

    if let Err(e) = snapshots::push_entry(&pool, hospital_id, &entry).await {
        snapshots::log_sync_failure(hospital_id, "push_entry", &e);
    }

    tracing::info!(hospital_id = %hospital_id, unit_id = %unit.id, "Inventory item added");

    Ok(entry)
}
