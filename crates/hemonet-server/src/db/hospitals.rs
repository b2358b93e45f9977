//! Hospital row access
//!
//! Hospitals are soft-deleted only; every read here filters `is_deleted`
//! so removed hospitals become unreachable without losing their rows.

use sqlx::types::Json;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Hospital, InventoryEntry};

const HOSPITAL_COLUMNS: &str = "id, name, address, province, district, ward, latitude, \
     longitude, blood_inventory, is_active, is_deleted, created_at, updated_at";

/// Field values for a hospital about to be inserted.
#[derive(Debug, Clone)]
pub struct NewHospital {
    pub name: String,
    pub address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
}

/// Optional field changes for a hospital update; the snapshot array is
/// never touched here.
#[derive(Debug, Clone, Default)]
pub struct HospitalChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: Option<bool>,
}

impl HospitalChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.province.is_none()
            && self.district.is_none()
            && self.ward.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.is_active.is_none()
    }
}

/// Fetch one non-deleted hospital.
pub async fn find_live_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Hospital>, sqlx::Error> {
    let sql = format!("SELECT {HOSPITAL_COLUMNS} FROM hospitals WHERE id = $1 AND NOT is_deleted");

    sqlx::query_as::<_, Hospital>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Check that a non-deleted hospital with this id exists.
pub async fn exists_live<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM hospitals WHERE id = $1 AND NOT is_deleted)",
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

/// Check whether a non-deleted hospital already uses this name in the
/// given district.
pub async fn name_taken_in_district<'e, E: PgExecutor<'e>>(
    executor: E,
    name: &str,
    district: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM hospitals WHERE name = $1 AND district = $2 AND NOT is_deleted)",
    )
    .bind(name)
    .bind(district)
    .fetch_one(executor)
    .await
}

/// Insert a hospital row with an initial (possibly empty) snapshot array.
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital: &NewHospital,
    inventory: &[InventoryEntry],
) -> Result<Hospital, sqlx::Error> {
    let sql = format!(
        "INSERT INTO hospitals \
         (name, address, province, district, ward, latitude, longitude, blood_inventory, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {HOSPITAL_COLUMNS}"
    );

    sqlx::query_as::<_, Hospital>(&sql)
        .bind(&hospital.name)
        .bind(&hospital.address)
        .bind(&hospital.province)
        .bind(&hospital.district)
        .bind(&hospital.ward)
        .bind(hospital.latitude)
        .bind(hospital.longitude)
        .bind(Json(inventory))
        .bind(hospital.is_active)
        .fetch_one(executor)
        .await
}

/// Apply the supplied metadata/location changes to one non-deleted hospital.
///
/// Returns the updated row, or `None` when no live row matches.
pub async fn update_metadata<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    changes: &HospitalChanges,
) -> Result<Option<Hospital>, sqlx::Error> {
    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("UPDATE hospitals SET updated_at = now()");

    if let Some(ref name) = changes.name {
        qb.push(", name = ");
        qb.push_bind(name.clone());
    }
    if let Some(ref address) = changes.address {
        qb.push(", address = ");
        qb.push_bind(address.clone());
    }
    if let Some(ref province) = changes.province {
        qb.push(", province = ");
        qb.push_bind(province.clone());
    }
    if let Some(ref district) = changes.district {
        qb.push(", district = ");
        qb.push_bind(district.clone());
    }
    if let Some(ref ward) = changes.ward {
        qb.push(", ward = ");
        qb.push_bind(ward.clone());
    }
    if let Some(latitude) = changes.latitude {
        qb.push(", latitude = ");
        qb.push_bind(latitude);
    }
    if let Some(longitude) = changes.longitude {
        qb.push(", longitude = ");
        qb.push_bind(longitude);
    }
    if let Some(is_active) = changes.is_active {
        qb.push(", is_active = ");
        qb.push_bind(is_active);
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" AND NOT is_deleted RETURNING ");
    qb.push(HOSPITAL_COLUMNS);

    qb.build_query_as::<Hospital>()
        .fetch_optional(executor)
        .await
}

/// Soft-delete one hospital. Its blood units stay in place; the row just
/// becomes unreachable through normal queries.
pub async fn soft_delete<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE hospitals SET is_deleted = TRUE, updated_at = now() \
         WHERE id = $1 AND NOT is_deleted",
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// One-hop cascade of a hospital soft delete onto its staff records.
pub async fn soft_delete_staff<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE hospital_staff SET is_deleted = TRUE, is_active = FALSE, updated_at = now() \
         WHERE hospital_id = $1 AND NOT is_deleted",
    )
    .bind(hospital_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_is_empty() {
        assert!(HospitalChanges::default().is_empty());

        let changes = HospitalChanges {
            ward: Some("Dich Vong".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
