//! Database row types shared across features

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// One authoritative blood unit row.
///
/// `blood_type` and `component` are stored in their canonical text forms;
/// validation against the closed value sets happens before insert.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BloodUnit {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a hospital's denormalized `blood_inventory` array.
///
/// A value copy of the displayable fields of a [`BloodUnit`], keyed by the
/// unit's id. Derived data only; the `blood_units` table stays authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: Uuid,
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BloodUnit> for InventoryEntry {
    fn from(unit: &BloodUnit) -> Self {
        Self {
            id: unit.id,
            blood_type: unit.blood_type.clone(),
            component: unit.component.clone(),
            quantity: unit.quantity,
            expires_at: unit.expires_at,
            created_at: unit.created_at,
            updated_at: unit.updated_at,
        }
    }
}

/// One hospital row, including the embedded inventory snapshot.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub latitude: f64,
    pub longitude: f64,
    pub blood_inventory: Json<Vec<InventoryEntry>>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hospital display fields carried alongside joined blood units and
/// aggregation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRef {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_unit() -> BloodUnit {
        let now = Utc::now();
        BloodUnit {
            id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            blood_type: "O+".to_string(),
            component: "red_cells".to_string(),
            quantity: 5,
            expires_at: now + chrono::Duration::days(7),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_entry_copies_unit_fields() {
        let unit = sample_unit();
        let entry = InventoryEntry::from(&unit);

        assert_eq!(entry.id, unit.id);
        assert_eq!(entry.blood_type, unit.blood_type);
        assert_eq!(entry.component, unit.component);
        assert_eq!(entry.quantity, unit.quantity);
        assert_eq!(entry.expires_at, unit.expires_at);
    }

    #[test]
    fn test_entry_json_keys_match_snapshot_queries() {
        // Snapshot pulls filter on entry->>'id'; the serialized key must
        // stay `id` with the plain hyphenated UUID form.
        let unit = sample_unit();
        let value = serde_json::to_value(InventoryEntry::from(&unit)).unwrap();

        assert_eq!(value["id"], serde_json::json!(unit.id.to_string()));
        assert!(value.get("blood_type").is_some());
        assert!(value.get("component").is_some());
        assert!(value.get("quantity").is_some());
        assert!(value.get("expires_at").is_some());
    }
}
