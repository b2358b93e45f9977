//! Expiry sweep command
//!
//! On-demand removal of every unit whose expiration has passed. The store
//! delete happens as one batch statement; snapshot cleanup then runs as an
//! independent statement per affected hospital, so one hospital's failure
//! never blocks the others.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db::{blood_units, snapshots};

/// Command to remove all expired blood units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveExpiredCommand {}

/// Response from an expiry sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveExpiredResponse {
    /// Units removed from the authoritative store.
    pub removed: u64,
    /// Hospitals whose snapshots were touched.
    pub hospitals_affected: u64,
}

/// Errors that can occur during the expiry sweep
#[derive(Debug, thiserror::Error)]
pub enum RemoveExpiredError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<RemoveExpiredResponse, RemoveExpiredError>> for RemoveExpiredCommand {}

impl crate::cqrs::middleware::Command for RemoveExpiredCommand {}

/// Handles the expiry sweep command
#[tracing::instrument(skip(pool, _command))]
pub async fn handle(
    pool: PgPool,
    _command: RemoveExpiredCommand,
) -> Result<RemoveExpiredResponse, RemoveExpiredError> {
    let now = chrono::Utc::now();

    let expired = blood_units::delete_expired(&pool, now).await?;
    let grouped = blood_units::group_by_hospital(&expired);
    let hospitals_affected = grouped.len() as u64;

    for (hospital_id, unit_ids) in grouped {
        if let Err(e) = snapshots::pull_entries(&pool, hospital_id, &unit_ids).await {
            snapshots::log_sync_failure(hospital_id, "pull_entries", &e);
        }
    }

    tracing::info!(
        removed = expired.len(),
        hospitals_affected,
        "Expired blood units removed"
    );

    Ok(RemoveExpiredResponse {
        removed: expired.len() as u64,
        hospitals_affected,
    })
}
