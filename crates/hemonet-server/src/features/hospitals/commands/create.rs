//! Create hospital command
//!
//! Creates a hospital together with an optional initial blood inventory.
//! The whole payload is validated before any row is written: a single bad
//! inventory item rejects the request with nothing persisted.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::{blood_units, hospitals, snapshots};
use crate::features::hospitals::types::{validate_items, InventoryItemError, InventoryItemInput};
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validation::{
    validate_coordinates, validate_name, CoordinateError, NameValidationError,
};
use crate::models::{Hospital, InventoryEntry};

/// Command to create a new hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHospitalCommand {
    pub name: String,
    pub address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub blood_inventory: Vec<InventoryItemInput>,
}

/// Errors that can occur when creating a hospital
#[derive(Debug, thiserror::Error)]
pub enum CreateHospitalError {
    #[error("Field validation failed: {0}")]
    Field(#[from] NameValidationError),

    #[error("Coordinate validation failed: {0}")]
    Coordinates(#[from] CoordinateError),

    #[error("Invalid inventory item: {0}")]
    Inventory(#[from] InventoryItemError),

    #[error("Hospital '{name}' already exists in district '{district}'")]
    Duplicate { name: String, district: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Hospital, CreateHospitalError>> for CreateHospitalCommand {}

impl crate::cqrs::middleware::Command for CreateHospitalCommand {}

impl CreateHospitalCommand {
    /// Validate the command against an explicit `now`, returning the parsed
    /// initial inventory.
    pub fn validate_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<blood_units::NewBloodUnit>, CreateHospitalError> {
        validate_name(&self.name, "name", 256)?;
        validate_name(&self.address, "address", 512)?;
        validate_name(&self.province, "province", 128)?;
        validate_name(&self.district, "district", 128)?;
        validate_name(&self.ward, "ward", 128)?;
        validate_coordinates(self.latitude, self.longitude)?;

        Ok(validate_items(&self.blood_inventory, now)?)
    }

    pub fn validate(&self) -> Result<Vec<blood_units::NewBloodUnit>, CreateHospitalError> {
        self.validate_at(Utc::now())
    }
}

/// Handles the create hospital command
///
/// 1. Validates every field and every initial inventory item (fail fast)
/// 2. Rejects a duplicate (name, district) among non-deleted hospitals
/// 3. Inserts the hospital row, bulk-inserts the initial units, and writes
///    the snapshot array, all in one transaction
#[tracing::instrument(skip(pool, command), fields(name = %command.name, district = %command.district))]
pub async fn handle(
    pool: PgPool,
    command: CreateHospitalCommand,
) -> Result<Hospital, CreateHospitalError> {
    let initial_units = command.validate()?;

    if hospitals::name_taken_in_district(&pool, &command.name, &command.district).await? {
        return Err(CreateHospitalError::Duplicate {
            name: command.name.clone(),
            district: command.district.clone(),
        });
    }

    let new_hospital = hospitals::NewHospital {
        name: command.name.clone(),
        address: command.address.clone(),
        province: command.province.clone(),
        district: command.district.clone(),
        ward: command.ward.clone(),
        latitude: command.latitude,
        longitude: command.longitude,
        is_active: command.is_active.unwrap_or(true),
    };

    let mut tx = pool.begin().await?;

    let mut hospital = hospitals::insert(&mut *tx, &new_hospital, &[])
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                CreateHospitalError::Duplicate {
                    name: command.name.clone(),
                    district: command.district.clone(),
                },
                CreateHospitalError::Database,
            )
        })?;

    let units = blood_units::insert_many(&mut tx, hospital.id, &initial_units).await?;
    let entries: Vec<InventoryEntry> = units.iter().map(InventoryEntry::from).collect();

    if !entries.is_empty() {
        snapshots::replace_all(&mut *tx, hospital.id, &entries).await?;
    }

    tx.commit().await?;

    hospital.blood_inventory = Json(entries);

    tracing::info!(hospital_id = %hospital.id, units = hospital.blood_inventory.0.len(), "Hospital created");

    Ok(hospital)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn base_command() -> CreateHospitalCommand {
        CreateHospitalCommand {
            name: "City General".to_string(),
            address: "12 Nguyen Trai".to_string(),
            province: "Ha Noi".to_string(),
            district: "Cau Giay".to_string(),
            ward: "Dich Vong".to_string(),
            latitude: 21.0285,
            longitude: 105.8542,
            is_active: None,
            blood_inventory: vec![],
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(base_command().validate_at(fixed_now()).is_ok());
    }

    #[test]
    fn test_validation_success_with_inventory() {
        let mut cmd = base_command();
        cmd.blood_inventory.push(InventoryItemInput {
            blood_type: "O+".to_string(),
            component: "red_cells".to_string(),
            quantity: 5,
            expires_at: "2026-01-22T12:00:00Z".to_string(),
        });

        let parsed = cmd.validate_at(fixed_now()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].blood_type, "O+");
    }

    #[test]
    fn test_validation_empty_name() {
        let mut cmd = base_command();
        cmd.name = "  ".to_string();
        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(CreateHospitalError::Field(_))
        ));
    }

    #[test]
    fn test_validation_bad_coordinates() {
        let mut cmd = base_command();
        cmd.latitude = 95.0;
        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(CreateHospitalError::Coordinates(CoordinateError::Latitude))
        ));
    }

    #[test]
    fn test_validation_rejects_expired_initial_item() {
        let mut cmd = base_command();
        cmd.blood_inventory.push(InventoryItemInput {
            blood_type: "A+".to_string(),
            component: "plasma".to_string(),
            quantity: 2,
            expires_at: "2026-01-01T00:00:00Z".to_string(),
        });

        assert!(matches!(
            cmd.validate_at(fixed_now()),
            Err(CreateHospitalError::Inventory(_))
        ));
    }
}
