//! Update hospital command
//!
//! Updates hospital metadata and location fields. The embedded inventory
//! snapshot is never written here; inventory changes go through the
//! dedicated inventory commands.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::hospitals::{self, HospitalChanges};
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validation::{
    validate_coordinates, validate_identifier, validate_name, CoordinateError, IdentifierError,
    NameValidationError,
};
use crate::models::Hospital;

/// Command to update hospital metadata/location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHospitalCommand {
    /// Set from the request path, not the body.
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Errors that can occur when updating a hospital
#[derive(Debug, thiserror::Error)]
pub enum UpdateHospitalError {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Field validation failed: {0}")]
    Field(#[from] NameValidationError),

    #[error("Coordinate validation failed: {0}")]
    Coordinates(#[from] CoordinateError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Hospital '{0}' not found")]
    NotFound(Uuid),

    #[error("Hospital name already in use in its district")]
    Duplicate,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Hospital, UpdateHospitalError>> for UpdateHospitalCommand {}

impl crate::cqrs::middleware::Command for UpdateHospitalCommand {}

impl UpdateHospitalCommand {
    pub fn validate(&self) -> Result<(Uuid, HospitalChanges), UpdateHospitalError> {
        let id = validate_identifier(&self.id)?;

        if let Some(ref name) = self.name {
            validate_name(name, "name", 256)?;
        }
        if let Some(ref address) = self.address {
            validate_name(address, "address", 512)?;
        }
        if let Some(ref province) = self.province {
            validate_name(province, "province", 128)?;
        }
        if let Some(ref district) = self.district {
            validate_name(district, "district", 128)?;
        }
        if let Some(ref ward) = self.ward {
            validate_name(ward, "ward", 128)?;
        }
        if self.latitude.is_some() || self.longitude.is_some() {
            // Either coordinate alone is validated against a neutral
            // counterpart; the database keeps the other unchanged.
            validate_coordinates(
                self.latitude.unwrap_or(0.0),
                self.longitude.unwrap_or(0.0),
            )?;
        }

        let changes = HospitalChanges {
            name: self.name.clone(),
            address: self.address.clone(),
            province: self.province.clone(),
            district: self.district.clone(),
            ward: self.ward.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            is_active: self.is_active,
        };

        if changes.is_empty() {
            return Err(UpdateHospitalError::NoFieldsToUpdate);
        }

        Ok((id, changes))
    }
}

/// Handles the update hospital command
#[tracing::instrument(skip(pool, command), fields(id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateHospitalCommand,
) -> Result<Hospital, UpdateHospitalError> {
    let (id, changes) = command.validate()?;

    let hospital = hospitals::update_metadata(&pool, id, &changes)
        .await
        .map_err(|e| {
            map_unique_violation(e, UpdateHospitalError::Duplicate, UpdateHospitalError::Database)
        })?
        .ok_or(UpdateHospitalError::NotFound(id))?;

    tracing::info!(hospital_id = %hospital.id, "Hospital updated");

    Ok(hospital)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_command(id: &str) -> UpdateHospitalCommand {
        UpdateHospitalCommand {
            id: id.to_string(),
            name: None,
            address: None,
            province: None,
            district: None,
            ward: None,
            latitude: None,
            longitude: None,
            is_active: None,
        }
    }

    #[test]
    fn test_validation_malformed_id() {
        let mut cmd = base_command("not-a-uuid");
        cmd.name = Some("New Name".to_string());
        assert!(matches!(
            cmd.validate(),
            Err(UpdateHospitalError::Identifier(_))
        ));
    }

    #[test]
    fn test_validation_no_fields() {
        let cmd = base_command(&Uuid::new_v4().to_string());
        assert!(matches!(
            cmd.validate(),
            Err(UpdateHospitalError::NoFieldsToUpdate)
        ));
    }

    #[test]
    fn test_validation_success() {
        let mut cmd = base_command(&Uuid::new_v4().to_string());
        cmd.ward = Some("Ben Nghe".to_string());
        cmd.is_active = Some(false);

        let (_, changes) = cmd.validate().unwrap();
        assert_eq!(changes.ward.as_deref(), Some("Ben Nghe"));
        assert_eq!(changes.is_active, Some(false));
    }

    #[test]
    fn test_validation_bad_longitude() {
        let mut cmd = base_command(&Uuid::new_v4().to_string());
        cmd.longitude = Some(200.0);
        assert!(matches!(
            cmd.validate(),
            Err(UpdateHospitalError::Coordinates(CoordinateError::Longitude))
        ));
    }
}
