//! Shared types for the blood units feature

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::HospitalRef;

/// Joined SELECT used by unit reads: unit columns plus the owning
/// hospital's display fields. Statements built on top of this append
/// further `AND` conditions and ordering.
pub(crate) const UNIT_SELECT_JOINED: &str =
    "SELECT bu.id, bu.hospital_id, bu.blood_type, bu.component, bu.quantity, \
            bu.expires_at, bu.created_at, bu.updated_at, \
            h.name AS hospital_name, h.address AS hospital_address \
     FROM blood_units bu \
     JOIN hospitals h ON h.id = bu.hospital_id \
     WHERE 1=1";

/// Count over the same join so totals always match the page filter.
pub(crate) const UNIT_COUNT_JOINED: &str =
    "SELECT COUNT(*) FROM blood_units bu JOIN hospitals h ON h.id = bu.hospital_id WHERE 1=1";

/// One blood unit row with its hospital's display fields, as fetched.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JoinedUnitRow {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub hospital_name: String,
    pub hospital_address: String,
}

/// API shape of a blood unit: the hospital's fields nested under the
/// unit's hospital reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodUnitView {
    pub id: Uuid,
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub hospital: HospitalRef,
}

impl From<JoinedUnitRow> for BloodUnitView {
    fn from(row: JoinedUnitRow) -> Self {
        Self {
            id: row.id,
            blood_type: row.blood_type,
            component: row.component,
            quantity: row.quantity,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            hospital: HospitalRef {
                id: row.hospital_id,
                name: row.hospital_name,
                address: Some(row.hospital_address),
            },
        }
    }
}
