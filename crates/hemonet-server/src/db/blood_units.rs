//! Authoritative blood unit store
//!
//! Every mutation here is the source of truth; the owning hospital's
//! embedded snapshot is updated afterwards via [`crate::db::snapshots`].
//! Expiration and quantity validation happens in the command layer before
//! any of these run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::models::BloodUnit;

const UNIT_COLUMNS: &str =
    "id, hospital_id, blood_type, component, quantity, expires_at, created_at, updated_at";

/// Field values for a unit about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBloodUnit {
    pub blood_type: String,
    pub component: String,
    pub quantity: i32,
    pub expires_at: DateTime<Utc>,
}

/// Optional field changes for a unit update; `None` leaves a field as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BloodUnitChanges {
    pub blood_type: Option<String>,
    pub component: Option<String>,
    pub quantity: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub hospital_id: Option<Uuid>,
}

impl BloodUnitChanges {
    pub fn is_empty(&self) -> bool {
        self.blood_type.is_none()
            && self.component.is_none()
            && self.quantity.is_none()
            && self.expires_at.is_none()
            && self.hospital_id.is_none()
    }
}

/// A row removed by the expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ExpiredUnit {
    pub id: Uuid,
    pub hospital_id: Uuid,
}

pub async fn insert_one<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
    unit: &NewBloodUnit,
) -> Result<BloodUnit, sqlx::Error> {
    let sql = format!(
        "INSERT INTO blood_units (hospital_id, blood_type, component, quantity, expires_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {UNIT_COLUMNS}"
    );

    sqlx::query_as::<_, BloodUnit>(&sql)
        .bind(hospital_id)
        .bind(&unit.blood_type)
        .bind(&unit.component)
        .bind(unit.quantity)
        .bind(unit.expires_at)
        .fetch_one(executor)
        .await
}

/// Insert a batch of units for one hospital inside `tx`.
///
/// Runs inside the caller's transaction so a failure partway through rolls
/// back the whole batch rather than leaving a partial insert.
pub async fn insert_many(
    tx: &mut Transaction<'_, Postgres>,
    hospital_id: Uuid,
    units: &[NewBloodUnit],
) -> Result<Vec<BloodUnit>, sqlx::Error> {
    let mut inserted = Vec::with_capacity(units.len());
    for unit in units {
        inserted.push(insert_one(&mut **tx, hospital_id, unit).await?);
    }
    Ok(inserted)
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<BloodUnit>, sqlx::Error> {
    let sql = format!("SELECT {UNIT_COLUMNS} FROM blood_units WHERE id = $1");

    sqlx::query_as::<_, BloodUnit>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_hospital<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
) -> Result<Vec<BloodUnit>, sqlx::Error> {
    let sql = format!(
        "SELECT {UNIT_COLUMNS} FROM blood_units WHERE hospital_id = $1 ORDER BY created_at DESC"
    );

    sqlx::query_as::<_, BloodUnit>(&sql)
        .bind(hospital_id)
        .fetch_all(executor)
        .await
}

/// Apply the supplied field changes to one unit.
///
/// Returns the updated row, or `None` when no row matches.
pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    changes: &BloodUnitChanges,
) -> Result<Option<BloodUnit>, sqlx::Error> {
    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("UPDATE blood_units SET updated_at = now()");

    if let Some(ref blood_type) = changes.blood_type {
        qb.push(", blood_type = ");
        qb.push_bind(blood_type.clone());
    }
    if let Some(ref component) = changes.component {
        qb.push(", component = ");
        qb.push_bind(component.clone());
    }
    if let Some(quantity) = changes.quantity {
        qb.push(", quantity = ");
        qb.push_bind(quantity);
    }
    if let Some(expires_at) = changes.expires_at {
        qb.push(", expires_at = ");
        qb.push_bind(expires_at);
    }
    if let Some(hospital_id) = changes.hospital_id {
        qb.push(", hospital_id = ");
        qb.push_bind(hospital_id);
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING ");
    qb.push(UNIT_COLUMNS);

    qb.build_query_as::<BloodUnit>()
        .fetch_optional(executor)
        .await
}

/// Delete one unit, returning the removed row when it existed.
pub async fn delete_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<BloodUnit>, sqlx::Error> {
    let sql = format!("DELETE FROM blood_units WHERE id = $1 RETURNING {UNIT_COLUMNS}");

    sqlx::query_as::<_, BloodUnit>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Delete every unit belonging to one hospital, returning the count removed.
pub async fn delete_by_hospital<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blood_units WHERE hospital_id = $1")
        .bind(hospital_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every unit expired as of `now`.
///
/// Returns the removed rows' ids together with their owning hospitals so
/// the caller can clean up each affected snapshot.
pub async fn delete_expired<'e, E: PgExecutor<'e>>(
    executor: E,
    now: DateTime<Utc>,
) -> Result<Vec<ExpiredUnit>, sqlx::Error> {
    sqlx::query_as::<_, ExpiredUnit>(
        "DELETE FROM blood_units WHERE expires_at < $1 RETURNING id, hospital_id",
    )
    .bind(now)
    .fetch_all(executor)
    .await
}

/// Group swept rows by owning hospital, preserving a stable order.
pub fn group_by_hospital(expired: &[ExpiredUnit]) -> BTreeMap<Uuid, Vec<Uuid>> {
    let mut grouped: BTreeMap<Uuid, Vec<Uuid>> = BTreeMap::new();
    for unit in expired {
        grouped.entry(unit.hospital_id).or_default().push(unit.id);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_is_empty() {
        assert!(BloodUnitChanges::default().is_empty());

        let changes = BloodUnitChanges {
            quantity: Some(3),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_group_by_hospital_collects_per_owner() {
        let hospital_a = Uuid::new_v4();
        let hospital_b = Uuid::new_v4();
        let units = vec![
            ExpiredUnit {
                id: Uuid::new_v4(),
                hospital_id: hospital_a,
            },
            ExpiredUnit {
                id: Uuid::new_v4(),
                hospital_id: hospital_b,
            },
            ExpiredUnit {
                id: Uuid::new_v4(),
                hospital_id: hospital_a,
            },
        ];

        let grouped = group_by_hospital(&units);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&hospital_a].len(), 2);
        assert_eq!(grouped[&hospital_b], vec![units[1].id]);
    }

    #[test]
    fn test_group_by_hospital_empty_sweep() {
        assert!(group_by_hospital(&[]).is_empty());
    }
}
