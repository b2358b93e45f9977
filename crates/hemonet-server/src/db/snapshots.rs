//! Snapshot synchronization
//!
//! Propagates authoritative `blood_units` writes into the owning hospital's
//! embedded `blood_inventory` array. Entries are matched by unit id; array
//! position carries no meaning, so replacements drop the old entry and
//! append the rebuilt one.
//!
//! None of these run inside a transaction with the store write they follow.
//! The store write is authoritative; when a snapshot statement fails
//! afterwards the command layer calls [`log_sync_failure`] and reports
//! success anyway, leaving a stale snapshot for an external reconciliation
//! pass to rebuild.

use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::InventoryEntry;

/// Append one entry to a hospital's snapshot array.
pub async fn push_entry<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
    entry: &InventoryEntry,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE hospitals SET blood_inventory = blood_inventory || $2, updated_at = now() \
         WHERE id = $1",
    )
    .bind(hospital_id)
    .bind(Json(entry))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove the entry with the given unit id from a hospital's snapshot array.
pub async fn pull_entry<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
    unit_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE hospitals SET blood_inventory = COALESCE( \
           (SELECT jsonb_agg(entry) FROM jsonb_array_elements(blood_inventory) AS entry \
            WHERE entry->>'id' <> $2), '[]'::jsonb), updated_at = now() \
         WHERE id = $1",
    )
    .bind(hospital_id)
    .bind(unit_id.to_string())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove every entry whose unit id is in `unit_ids` from one hospital's
/// snapshot array. Used by the expiry sweep, one statement per hospital.
pub async fn pull_entries<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
    unit_ids: &[Uuid],
) -> Result<bool, sqlx::Error> {
    if unit_ids.is_empty() {
        return Ok(false);
    }

    let ids: Vec<String> = unit_ids.iter().map(Uuid::to_string).collect();

    let result = sqlx::query(
        "UPDATE hospitals SET blood_inventory = COALESCE( \
           (SELECT jsonb_agg(entry) FROM jsonb_array_elements(blood_inventory) AS entry \
            WHERE NOT (entry->>'id' = ANY($2))), '[]'::jsonb), updated_at = now() \
         WHERE id = $1",
    )
    .bind(hospital_id)
    .bind(ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrite a hospital's snapshot array wholesale.
pub async fn replace_all<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
    entries: &[InventoryEntry],
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE hospitals SET blood_inventory = $2, updated_at = now() \
         WHERE id = $1 AND NOT is_deleted",
    )
    .bind(hospital_id)
    .bind(Json(entries))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record a snapshot write that failed after its store write committed.
///
/// The hospital's snapshot is stale until a reconciliation pass rebuilds
/// it from the blood unit store.
pub fn log_sync_failure(hospital_id: Uuid, operation: &str, err: &sqlx::Error) {
    tracing::warn!(
        hospital_id = %hospital_id,
        operation,
        error = ?err,
        "Snapshot update failed after store write; snapshot is stale until reconciled"
    );
}
