//! Replace hospital inventory command
//!
//! Replaces a hospital's whole inventory: the existing blood units are
//! deleted and the new set inserted in one transaction, then the snapshot
//! array is overwritten wholesale with the fresh entries. Two concurrent
//! replacements of the same hospital are last-writer-wins; callers that
//! need stronger guarantees must serialize per hospital.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{blood_units, hospitals, snapshots};
use crate::features::hospitals::types::{validate_items, InventoryItemError, InventoryItemInput};
use crate::features::shared::validation::{validate_identifier, IdentifierError};
use crate::models::InventoryEntry;

/// Command to replace a hospital's whole blood inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceInventoryCommand {
    /// Set from the request path, not the body.
    #[serde(default)]
    pub hospital_id: String,
    pub items: Vec<InventoryItemInput>,
}

/// Response from replacing a hospital's inventory
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceInventoryResponse {
    pub hospital_id: Uuid,
    pub items: Vec<InventoryEntry>,
}

/// Errors that can occur when replacing an inventory
#[derive(Debug, thiserror::Error)]
pub enum ReplaceInventoryError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Invalid inventory item: {0}")]
    Inventory(#[from] InventoryItemError),

    #[error("Hospital '{0}' not found")]
    HospitalNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ReplaceInventoryResponse, ReplaceInventoryError>> for ReplaceInventoryCommand {}

impl crate::cqrs::middleware::Command for ReplaceInventoryCommand {}

impl ReplaceInventoryCommand {
    pub fn validate_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, Vec<blood_units::NewBloodUnit>), ReplaceInventoryError> {
        let hospital_id = validate_identifier(&self.hospital_id)?;
        let parsed = validate_items(&self.items, now)?;
        Ok((hospital_id, parsed))
    }

    pub fn validate(&self) -> Result<(Uuid, Vec<blood_units::NewBloodUnit>), ReplaceInventoryError> {
        self.validate_at(Utc::now())
    }
}

/// Handles the replace inventory command
///
/// The authoritative store is rewritten first (delete + bulk insert, one
/// transaction, so a failure can't leave a partial insert). The snapshot
/// overwrite runs afterwards as its own statement; if it fails the store
/// remains correct and the stale snapshot is logged for reconciliation.
#[tracing::instrument(skip(pool, command), fields(hospital_id = %command.hospital_id, items = command.items.len()))]
pub async fn handle(
    pool: PgPool,
    command: ReplaceInventoryCommand,
) -> Result<ReplaceInventoryResponse, ReplaceInventoryError> {
    let (hospital_id, new_units) = command.validate()?;

    if !hospitals::exists_live(&pool, hospital_id).await? {
        return Err(ReplaceInventoryError::HospitalNotFound(hospital_id));
    }

    let mut tx = pool.begin().await?;
    blood_units::delete_by_hospital(&mut *tx, hospital_id).await?;
    let units = blood_units::insert_many(&mut tx, hospital_id, &new_units).await?;
    tx.commit().await?;

    let entries: Vec<InventoryEntry> = units.iter().map(InventoryEntry::from).collect();

    if let Err(e) = snapshots::replace_all(&pool, hospital_id, &entries).await {
        snapshots::log_sync_failure(hospital_id, "replace_all", &e);
    }

    tracing::info!(hospital_id = %hospital_id, items = entries.len(), "Inventory replaced");

    Ok(ReplaceInventoryResponse {
        hospital_id,
        items: entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validation_parses_all_items() {
        let cmd = ReplaceInventoryCommand {
            hospital_id: Uuid::new_v4().to_string(),
            items: vec![
                InventoryItemInput {
                    blood_type: "O-".to_string(),
                    component: "platelets".to_string(),
                    quantity: 3,
                    expires_at: "2026-02-01T00:00:00Z".to_string(),
                },
                InventoryItemInput {
                    blood_type: "AB+".to_string(),
                    component: "plasma".to_string(),
                    quantity: 0,
                    expires_at: "2026-03-01T00:00:00Z".to_string(),
                },
            ],
        };

        let (_, parsed) = cmd.validate_at(fixed_now()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_validation_rejects_whole_batch_on_one_bad_item() {
        let cmd = ReplaceInventoryCommand {
            hospital_id: Uuid::new_v4().to_string(),
            items: vec![
                InventoryItemInput {
                    blood_type: "O-".to_string(),
                    component: "platelets".to_string(),
                    quantity: 3,
                    expires_at: "2026-02-01T00:00:00Z".to_string(),
                },
                InventoryItemInput {
                    blood_type: "O-".to_string(),
                    component: "platelets".to_string(),
                    quantity: 3,
                    expires_at: "not a date".to_string(),
                },
            ],
        };

        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(ReplaceInventoryError::Inventory(_))
        ));
    }

    #[test]
    fn test_validation_empty_list_clears_inventory() {
        let cmd = ReplaceInventoryCommand {
            hospital_id: Uuid::new_v4().to_string(),
            items: vec![],
        };

        let (_, parsed) = cmd.validate_at(fixed_now()).unwrap();
        assert!(parsed.is_empty());
    }
}
