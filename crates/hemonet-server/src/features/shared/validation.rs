//! Shared validation utilities
//!
//! Small pure validators used by commands and queries before any database
//! work happens. Every write path that sets or changes an expiration goes
//! through [`validate_expiration`]; there is no bypass, including batch
//! inserts.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use hemonet_common::types::{BloodComponent, BloodType, BLOOD_COMPONENTS, BLOOD_TYPES};

/// Errors that can occur during expiration validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpirationError {
    #[error("Expiration date is required")]
    Required,

    #[error("Invalid expiration date: {0}")]
    Unparsable(String),

    #[error("Expiration date must be in the future")]
    NotInFuture,
}

/// Parse and check a raw expiration value against an explicit `now`.
///
/// Accepts RFC 3339 timestamps. The returned instant is always strictly
/// after `now`; a value equal to `now` is rejected.
pub fn validate_expiration_at(
    raw: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ExpirationError> {
    let raw = raw.ok_or(ExpirationError::Required)?;

    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| ExpirationError::Unparsable(raw.to_string()))?
        .with_timezone(&Utc);

    if parsed <= now {
        return Err(ExpirationError::NotInFuture);
    }

    Ok(parsed)
}

/// Parse and check a raw expiration value against the current time.
pub fn validate_expiration(raw: Option<&str>) -> Result<DateTime<Utc>, ExpirationError> {
    validate_expiration_at(raw, Utc::now())
}

/// Errors that can occur during identifier validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Identifier is required and cannot be empty")]
    Required,

    #[error("Malformed identifier: {0}")]
    Malformed(String),
}

/// Parse a raw identifier string into a UUID.
pub fn validate_identifier(raw: &str) -> Result<Uuid, IdentifierError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(IdentifierError::Required);
    }

    Uuid::parse_str(raw).map_err(|_| IdentifierError::Malformed(raw.to_string()))
}

/// Errors that can occur during quantity validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("Quantity cannot be negative")]
    Negative,
}

/// Check a unit quantity; zero is allowed, negative is not.
pub fn validate_quantity(quantity: i32) -> Result<(), QuantityError> {
    if quantity < 0 {
        return Err(QuantityError::Negative);
    }
    Ok(())
}

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be between 1 and {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },
}

/// Validate a required text field (after trimming whitespace).
pub fn validate_name(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), NameValidationError> {
    if value.trim().is_empty() {
        return Err(NameValidationError::Required { field });
    }

    if value.len() > max_length {
        return Err(NameValidationError::TooLong { field, max_length });
    }

    Ok(())
}

/// Errors that can occur during coordinate validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude must be between -90 and 90")]
    Latitude,

    #[error("Longitude must be between -180 and 180")]
    Longitude,
}

/// Validate a (latitude, longitude) pair.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CoordinateError> {
    if !(-90.0..=90.0).contains(&latitude) || !latitude.is_finite() {
        return Err(CoordinateError::Latitude);
    }
    if !(-180.0..=180.0).contains(&longitude) || !longitude.is_finite() {
        return Err(CoordinateError::Longitude);
    }
    Ok(())
}

/// Validate a blood type value against the closed ABO/Rh set.
pub fn validate_blood_type(blood_type: &str) -> Result<(), String> {
    if blood_type.is_empty() {
        return Err("Blood type is required".to_string());
    }

    blood_type.parse::<BloodType>().map(|_| ()).map_err(|_| {
        format!(
            "Invalid blood type: {}. Must be one of: {}",
            blood_type,
            BLOOD_TYPES.join(", ")
        )
    })
}

/// Validate a blood component value against the closed component set.
pub fn validate_component(component: &str) -> Result<(), String> {
    if component.is_empty() {
        return Err("Blood component is required".to_string());
    }

    component.parse::<BloodComponent>().map(|_| ()).map_err(|_| {
        format!(
            "Invalid blood component: {}. Must be one of: {}",
            component,
            BLOOD_COMPONENTS.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    // Expiration validation tests
    #[test]
    fn test_validate_expiration_future() {
        let result = validate_expiration_at(Some("2026-01-22T12:00:00Z"), fixed_now());
        assert_eq!(
            result.unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 22, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_expiration_offset_is_normalized() {
        // +07:00 offset five hours after `now` in UTC terms.
        let result = validate_expiration_at(Some("2026-01-16T00:00:00+07:00"), fixed_now());
        assert_eq!(
            result.unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_expiration_missing() {
        assert_eq!(
            validate_expiration_at(None, fixed_now()),
            Err(ExpirationError::Required)
        );
    }

    #[test]
    fn test_validate_expiration_unparsable() {
        assert!(matches!(
            validate_expiration_at(Some("next tuesday"), fixed_now()),
            Err(ExpirationError::Unparsable(_))
        ));
        assert!(matches!(
            validate_expiration_at(Some(""), fixed_now()),
            Err(ExpirationError::Unparsable(_))
        ));
    }

    #[test]
    fn test_validate_expiration_past() {
        assert_eq!(
            validate_expiration_at(Some("2026-01-01T00:00:00Z"), fixed_now()),
            Err(ExpirationError::NotInFuture)
        );
    }

    #[test]
    fn test_validate_expiration_exactly_now_rejected() {
        assert_eq!(
            validate_expiration_at(Some("2026-01-15T12:00:00Z"), fixed_now()),
            Err(ExpirationError::NotInFuture)
        );
    }

    // Identifier validation tests
    #[test]
    fn test_validate_identifier_valid() {
        let id = Uuid::new_v4();
        assert_eq!(validate_identifier(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_validate_identifier_empty() {
        assert_eq!(validate_identifier("  "), Err(IdentifierError::Required));
    }

    #[test]
    fn test_validate_identifier_malformed() {
        assert!(matches!(
            validate_identifier("not-a-uuid"),
            Err(IdentifierError::Malformed(_))
        ));
    }

    // Quantity validation tests
    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(120).is_ok());
        assert_eq!(validate_quantity(-1), Err(QuantityError::Negative));
    }

    // Name validation tests
    #[test]
    fn test_validate_name() {
        assert!(validate_name("City General", "name", 256).is_ok());
        assert_eq!(
            validate_name("   ", "name", 256),
            Err(NameValidationError::Required { field: "name" })
        );
        assert_eq!(
            validate_name(&"a".repeat(300), "name", 256),
            Err(NameValidationError::TooLong {
                field: "name",
                max_length: 256
            })
        );
    }

    // Coordinate validation tests
    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(10.7769, 106.7009).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert_eq!(
            validate_coordinates(91.0, 0.0),
            Err(CoordinateError::Latitude)
        );
        assert_eq!(
            validate_coordinates(0.0, -181.0),
            Err(CoordinateError::Longitude)
        );
        assert_eq!(
            validate_coordinates(f64::NAN, 0.0),
            Err(CoordinateError::Latitude)
        );
    }

    // Closed-set validation tests
    #[test]
    fn test_validate_blood_type() {
        assert!(validate_blood_type("AB-").is_ok());
        assert!(validate_blood_type("").is_err());
        assert!(validate_blood_type("C+").is_err());
    }

    #[test]
    fn test_validate_component() {
        assert!(validate_component("plasma").is_ok());
        assert!(validate_component("").is_err());
        assert!(validate_component("marrow").is_err());
    }
}
