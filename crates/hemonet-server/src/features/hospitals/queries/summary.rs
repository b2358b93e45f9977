//! Blood inventory summary query
//!
//! Cross-hospital totals: every active, non-deleted hospital's snapshot
//! entries are expanded into individual records in SQL, then grouped by
//! (blood type, component) in Rust, summing quantities and collecting the
//! distinct contributing hospitals.

use std::collections::BTreeMap;

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::HospitalRef;

const UNWIND_SQL: &str = "SELECT h.id AS hospital_id, h.name AS hospital_name, \
            entry->>'blood_type' AS blood_type, \
            entry->>'component' AS component, \
            COALESCE((entry->>'quantity')::bigint, 0) AS quantity \
     FROM hospitals h \
     CROSS JOIN LATERAL jsonb_array_elements(h.blood_inventory) AS entry \
     WHERE h.is_active AND NOT h.is_deleted";

/// Query for the cross-hospital blood inventory summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BloodSummaryQuery {}

/// One expanded snapshot entry with its hospital.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SummaryRow {
    pub hospital_id: Uuid,
    pub hospital_name: String,
    pub blood_type: String,
    pub component: String,
    pub quantity: i64,
}

/// One output record per observed (blood type, component) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodSummaryRecord {
    pub blood_type: String,
    pub component: String,
    pub total_quantity: i64,
    pub hospital_count: i64,
    pub hospitals: Vec<HospitalRef>,
}

/// Errors that can occur when building the summary
#[derive(Debug, thiserror::Error)]
pub enum BloodSummaryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<BloodSummaryRecord>, BloodSummaryError>> for BloodSummaryQuery {}

impl crate::cqrs::middleware::Query for BloodSummaryQuery {}

/// Group expanded entries by (blood type, component).
///
/// Quantities are summed per group; each hospital counts once per group no
/// matter how many entries it contributes. Output order is deterministic
/// (sorted by the group key).
pub fn fold_summary(rows: Vec<SummaryRow>) -> Vec<BloodSummaryRecord> {
    let mut groups: BTreeMap<(String, String), (i64, BTreeMap<Uuid, String>)> = BTreeMap::new();

    for row in rows {
        let group = groups
            .entry((row.blood_type, row.component))
            .or_default();
        group.0 += row.quantity;
        group.1.entry(row.hospital_id).or_insert(row.hospital_name);
    }

    groups
        .into_iter()
        .map(|((blood_type, component), (total_quantity, hospitals))| BloodSummaryRecord {
            blood_type,
            component,
            total_quantity,
            hospital_count: hospitals.len() as i64,
            hospitals: hospitals
                .into_iter()
                .map(|(id, name)| HospitalRef {
                    id,
                    name,
                    address: None,
                })
                .collect(),
        })
        .collect()
}

/// Handles the blood summary query
#[tracing::instrument(skip(pool, _query))]
pub async fn handle(
    pool: PgPool,
    _query: BloodSummaryQuery,
) -> Result<Vec<BloodSummaryRecord>, BloodSummaryError> {
    let rows = sqlx::query_as::<_, SummaryRow>(UNWIND_SQL)
        .fetch_all(&pool)
        .await?;

    Ok(fold_summary(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hospital: (Uuid, &str), blood_type: &str, component: &str, quantity: i64) -> SummaryRow {
        SummaryRow {
            hospital_id: hospital.0,
            hospital_name: hospital.1.to_string(),
            blood_type: blood_type.to_string(),
            component: component.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_fold_empty() {
        assert!(fold_summary(vec![]).is_empty());
    }

    #[test]
    fn test_fold_sums_across_hospitals() {
        let a = (Uuid::new_v4(), "North General");
        let b = (Uuid::new_v4(), "South Clinic");

        // Two active hospitals each holding 2 units of (A+, whole_blood).
        let records = fold_summary(vec![
            row(a, "A+", "whole_blood", 2),
            row(b, "A+", "whole_blood", 2),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].blood_type, "A+");
        assert_eq!(records[0].component, "whole_blood");
        assert_eq!(records[0].total_quantity, 4);
        assert_eq!(records[0].hospital_count, 2);
    }

    #[test]
    fn test_fold_groups_by_type_and_component() {
        let a = (Uuid::new_v4(), "North General");

        let records = fold_summary(vec![
            row(a, "A+", "whole_blood", 1),
            row(a, "A+", "plasma", 3),
            row(a, "O-", "whole_blood", 5),
        ]);

        assert_eq!(records.len(), 3);
        let plasma = records
            .iter()
            .find(|r| r.component == "plasma")
            .unwrap();
        assert_eq!(plasma.total_quantity, 3);
        assert_eq!(plasma.hospital_count, 1);
    }

    #[test]
    fn test_fold_counts_each_hospital_once_per_group() {
        let a = (Uuid::new_v4(), "North General");

        let records = fold_summary(vec![
            row(a, "B+", "red_cells", 2),
            row(a, "B+", "red_cells", 7),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_quantity, 9);
        assert_eq!(records[0].hospital_count, 1);
        assert_eq!(records[0].hospitals.len(), 1);
        assert_eq!(records[0].hospitals[0].name, "North General");
    }
}
