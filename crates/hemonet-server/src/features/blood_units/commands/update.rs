//! Update blood unit command
//!
//! Partial update of one unit. A supplied expiration re-runs the validator;
//! a supplied hospital moves the unit between hospitals. Snapshot entries
//! are replaced pull-then-push: the old entry is removed by id and the
//! rebuilt one appended, so array position is not preserved.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::blood_units::{self, BloodUnitChanges};
use crate::db::{hospitals, snapshots};
use crate::features::shared::validation::{
    validate_blood_type, validate_component, validate_expiration_at, validate_identifier,
    validate_quantity, ExpirationError, IdentifierError, QuantityError,
};
use crate::models::{BloodUnit, InventoryEntry};

/// Command to update a blood unit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateBloodUnitCommand {
    /// Set from the request path, not the body.
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Reassigns the unit to another hospital.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
}

/// Errors that can occur when updating a blood unit
#[derive(Debug, thiserror::Error)]
pub enum UpdateBloodUnitError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("{0}")]
    BloodType(String),

    #[error("{0}")]
    Component(String),

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error(transparent)]
    Expiration(#[from] ExpirationError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Blood unit '{0}' not found")]
    NotFound(Uuid),

    #[error("Hospital '{0}' not found")]
    HospitalNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<BloodUnit, UpdateBloodUnitError>> for UpdateBloodUnitCommand {}

impl crate::cqrs::middleware::Command for UpdateBloodUnitCommand {}

impl UpdateBloodUnitCommand {
    pub fn validate_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, BloodUnitChanges), UpdateBloodUnitError> {
        let id = validate_identifier(&self.id)?;

        if let Some(ref blood_type) = self.blood_type {
            validate_blood_type(blood_type).map_err(UpdateBloodUnitError::BloodType)?;
        }
        if let Some(ref component) = self.component {
            validate_component(component).map_err(UpdateBloodUnitError::Component)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }

        let expires_at = match self.expires_at {
            Some(ref raw) => Some(validate_expiration_at(Some(raw), now)?),
            None => None,
        };

        let hospital_id = match self.hospital_id {
            Some(ref raw) => Some(validate_identifier(raw)?),
            None => None,
        };

        let changes = BloodUnitChanges {
            blood_type: self.blood_type.clone(),
            component: self.component.clone(),
            quantity: self.quantity,
            expires_at,
            hospital_id,
        };

        if changes.is_empty() {
            return Err(UpdateBloodUnitError::NoFieldsToUpdate);
        }

        Ok((id, changes))
    }

    pub fn validate(&self) -> Result<(Uuid, BloodUnitChanges), UpdateBloodUnitError> {
        self.validate_at(Utc::now())
    }
}

/// Handles the update blood unit command
#[tracing::instrument(skip(pool, command), fields(id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateBloodUnitCommand,
) -> Result<BloodUnit, UpdateBloodUnitError> {
    let (id, changes) = command.validate()?;

    let existing = blood_units::find_by_id(&pool, id)
        .await?
        .ok_or(UpdateBloodUnitError::NotFound(id))?;

    if let Some(target) = changes.hospital_id {
        if target != existing.hospital_id && !hospitals::exists_live(&pool, target).await? {
            return Err(UpdateBloodUnitError::HospitalNotFound(target));
        }
    }

    let updated = blood_units::update_by_id(&pool, id, &changes)
        .await?
        .ok_or(UpdateBloodUnitError::NotFound(id))?;

    let entry = InventoryEntry::from(&updated);

    if updated.hospital_id != existing.hospital_id {
        // Reassigned: the entry leaves the old hospital's array and lands
        // in the new one's.
        if let Err(e) = snapshots::pull_entry(&pool, existing.hospital_id, id).await {
            snapshots::log_sync_failure(existing.hospital_id, "pull_entry", &e);
        }
        if let Err(e) = snapshots::push_entry(&pool, updated.hospital_id, &entry).await {
            snapshots::log_sync_failure(updated.hospital_id, "push_entry", &e);
        }
    } else {
        if let Err(e) = snapshots::pull_entry(&pool, existing.hospital_id, id).await {
            snapshots::log_sync_failure(existing.hospital_id, "pull_entry", &e);
        }
        if let Err(e) = snapshots::push_entry(&pool, existing.hospital_id, &entry).await {
            snapshots::log_sync_failure(existing.hospital_id, "push_entry", &e);
        }
    }

    tracing::info!(unit_id = %updated.id, "Blood unit updated");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validation_no_fields() {
        let cmd = UpdateBloodUnitCommand {
            id: Uuid::new_v4().to_string(),
            ..Default::default()
        };
        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(UpdateBloodUnitError::NoFieldsToUpdate)
        ));
    }

    #[test]
    fn test_validation_new_expiry_must_be_future() {
        let cmd = UpdateBloodUnitCommand {
            id: Uuid::new_v4().to_string(),
            expires_at: Some("2026-01-10T00:00:00Z".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(UpdateBloodUnitError::Expiration(
                ExpirationError::NotInFuture
            ))
        ));
    }

    #[test]
    fn test_validation_partial_update() {
        let cmd = UpdateBloodUnitCommand {
            id: Uuid::new_v4().to_string(),
            quantity: Some(0),
            ..Default::default()
        };

        let (_, changes) = cmd.validate_at(fixed_now()).unwrap();
        assert_eq!(changes.quantity, Some(0));
        assert!(changes.expires_at.is_none());
        assert!(changes.hospital_id.is_none());
    }

    #[test]
    fn test_validation_hospital_reassignment() {
        let target = Uuid::new_v4();
        let cmd = UpdateBloodUnitCommand {
            id: Uuid::new_v4().to_string(),
            hospital_id: Some(target.to_string()),
            ..Default::default()
        };

        let (_, changes) = cmd.validate_at(fixed_now()).unwrap();
        assert_eq!(changes.hospital_id, Some(target));
    }

    #[test]
    fn test_validation_malformed_target_hospital() {
        let cmd = UpdateBloodUnitCommand {
            id: Uuid::new_v4().to_string(),
            hospital_id: Some("garbage".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(UpdateBloodUnitError::Identifier(_))
        ));
    }
}
