//! Create blood unit command
//!
//! Inserts one unit into the authoritative store, then appends its entry to
//! the owning hospital's snapshot. The store insert comes first so the
//! entry carries a stable identifier.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{blood_units, hospitals, snapshots};
use crate::features::shared::validation::{
    validate_blood_type, validate_component, validate_expiration_at, validate_identifier,
    validate_quantity, ExpirationError, IdentifierError, QuantityError,
};
use crate::models::{BloodUnit, InventoryEntry};

/// Command to create a blood unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBloodUnitCommand {
    pub hospital_id: String,
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    /// RFC 3339 timestamp, strictly in the future.
    pub expires_at: String,
}

/// Errors that can occur when creating a blood unit
#[derive(Debug, thiserror::Error)]
pub enum CreateBloodUnitError {
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

    #[error("Hospital '{0}' not found")]
    HospitalNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<BloodUnit, CreateBloodUnitError>> for CreateBloodUnitCommand {}

impl crate::cqrs::middleware::Command for CreateBloodUnitCommand {}

impl CreateBloodUnitCommand {
    /// Validate the command against an explicit `now`. Runs before any
    /// database work, so a failing command persists nothing.
    pub fn validate_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, blood_units::NewBloodUnit), CreateBloodUnitError> {
        let hospital_id = validate_identifier(&self.hospital_id)?;
        validate_blood_type(&self.blood_type).map_err(CreateBloodUnitError::BloodType)?;
        validate_component(&self.component).map_err(CreateBloodUnitError::Component)?;
        validate_quantity(self.quantity)?;
        let expires_at = validate_expiration_at(Some(&self.expires_at), now)?;

        Ok((
            hospital_id,
            blood_units::NewBloodUnit {
                blood_type: self.blood_type.clone(),
                component: self.component.clone(),
                quantity: self.quantity,
                expires_at,
            },
        ))
    }

    pub fn validate(&self) -> Result<(Uuid, blood_units::NewBloodUnit), CreateBloodUnitError> {
        self.validate_at(Utc::now())
    }
}

/// Handles the create blood unit command
#[tracing::instrument(skip(pool, command), fields(hospital_id = %command.hospital_id, blood_type = %command.blood_type))]
pub async fn handle(
    pool: PgPool,
    command: CreateBloodUnitCommand,
) -> Result<BloodUnit, CreateBloodUnitError> {
    let (hospital_id, new_unit) = command.validate()?;

    if !hospitals::exists_live(&pool, hospital_id).await? {
        return Err(CreateBloodUnitError::HospitalNotFound(hospital_id));
    }

    let unit = blood_units::insert_one(&pool, hospital_id, &new_unit).await?;

    let entry = InventoryEntry::from(&unit);
    if let Err(e) = snapshots::push_entry(&pool, hospital_id, &entry).await {
        snapshots::log_sync_failure(hospital_id, "push_entry", &e);
    }

    tracing::info!(unit_id = %unit.id, "Blood unit created");

    Ok(unit)
}
