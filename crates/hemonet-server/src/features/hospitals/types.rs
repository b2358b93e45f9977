//! Shared types for the hospitals feature

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::blood_units::NewBloodUnit;
use crate::features::shared::validation::{
    validate_blood_type, validate_component, validate_expiration_at, validate_quantity,
    ExpirationError,
};

/// One inventory item as supplied by a caller.
///
/// `expires_at` arrives as a raw string and only becomes a timestamp after
/// passing the expiration validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemInput {
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    /// RFC 3339 timestamp, strictly in the future.
    pub expires_at: String,
}

/// Validation failure for one inventory item
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum InventoryItemError {
    #[error("{0}")]
    BloodType(String),

    #[error("{0}")]
    Component(String),

    #[error("Quantity cannot be negative")]
    Quantity,

    #[error(transparent)]
    Expiration(#[from] ExpirationError),
}

impl InventoryItemInput {
    /// Validate this item against `now`, producing insertable field values.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<NewBloodUnit, InventoryItemError> {
        validate_blood_type(&self.blood_type).map_err(InventoryItemError::BloodType)?;
        validate_component(&self.component).map_err(InventoryItemError::Component)?;
        validate_quantity(self.quantity).map_err(|_| InventoryItemError::Quantity)?;

        let expires_at = validate_expiration_at(Some(&self.expires_at), now)?;

        Ok(NewBloodUnit {
            blood_type: self.blood_type.clone(),
            component: self.component.clone(),
            quantity: self.quantity,
            expires_at,
        })
    }
}

/// Validate a whole batch against one `now`; any failing item rejects the
/// batch before anything is persisted.
pub fn validate_items(
    items: &[InventoryItemInput],
    now: DateTime<Utc>,
) -> Result<Vec<NewBloodUnit>, InventoryItemError> {
    items.iter().map(|item| item.validate_at(now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn item(blood_type: &str, expires_at: &str) -> InventoryItemInput {
        InventoryItemInput {
            blood_type: blood_type.to_string(),
            component: "red_cells".to_string(),
            quantity: 5,
            expires_at: expires_at.to_string(),
        }
    }

    #[test]
    fn test_valid_item_parses() {
        let parsed = item("O+", "2026-01-22T12:00:00Z")
            .validate_at(fixed_now())
            .unwrap();
        assert_eq!(parsed.blood_type, "O+");
        assert_eq!(parsed.quantity, 5);
    }

    #[test]
    fn test_invalid_blood_type_rejected() {
        let result = item("X+", "2026-01-22T12:00:00Z").validate_at(fixed_now());
        assert!(matches!(result, Err(InventoryItemError::BloodType(_))));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut bad = item("O+", "2026-01-22T12:00:00Z");
        bad.quantity = -1;
        assert_eq!(
            bad.validate_at(fixed_now()),
            Err(InventoryItemError::Quantity)
        );
    }

    #[test]
    fn test_past_expiry_rejected() {
        let result = item("O+", "2026-01-01T00:00:00Z").validate_at(fixed_now());
        assert_eq!(
            result,
            Err(InventoryItemError::Expiration(ExpirationError::NotInFuture))
        );
    }

    #[test]
    fn test_one_bad_item_rejects_the_batch() {
        let items = vec![
            item("O+", "2026-01-22T12:00:00Z"),
            item("A+", "2026-01-01T00:00:00Z"),
            item("B-", "2026-01-22T12:00:00Z"),
        ];

        let result = validate_items(&items, fixed_now());
        assert_eq!(
            result,
            Err(InventoryItemError::Expiration(ExpirationError::NotInFuture))
        );
    }

    #[test]
    fn test_empty_batch_is_valid() {
        assert_eq!(validate_items(&[], fixed_now()), Ok(vec![]));
    }
}
