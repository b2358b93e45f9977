//! Nearby hospitals query
//!
//! Geospatial search: active, non-deleted hospitals within a radius of a
//! point, nearest first. Distance is computed in SQL with the spherical
//! law of cosines over the stored coordinates; [`haversine_km`] is the
//! reference implementation of the same great-circle distance.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::validation::{validate_coordinates, CoordinateError};

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Smallest accepted search radius in kilometers.
pub const MIN_RADIUS_KM: f64 = 1.0;

/// Largest accepted search radius in kilometers.
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Hard cap on returned hospitals.
pub const MAX_NEARBY_RESULTS: i64 = 20;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const NEARBY_SQL: &str = "SELECT * FROM ( \
       SELECT id, name, address, province, district, ward, latitude, longitude, \
              is_active, created_at, updated_at, \
              (6371.0 * acos(LEAST(1.0, GREATEST(-1.0, \
                  cos(radians($1)) * cos(radians(latitude)) * cos(radians(longitude) - radians($2)) \
                  + sin(radians($1)) * sin(radians(latitude)))))) AS distance_km \
       FROM hospitals \
       WHERE is_active AND NOT is_deleted \
     ) nearby \
     WHERE distance_km <= $3 \
     ORDER BY distance_km ASC \
     LIMIT $4";

/// Query for hospitals near a point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyHospitalsQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in kilometers; defaults to 10, clamped to 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// One hospital in a nearby result, nearest first.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NearbyHospital {
    pub id: uuid::Uuid,
    pub name: String,
    pub address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub distance_km: f64,
}

/// Errors that can occur when searching nearby hospitals
#[derive(Debug, thiserror::Error)]
pub enum NearbyHospitalsError {
    #[error(transparent)]
    Coordinates(#[from] CoordinateError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<NearbyHospital>, NearbyHospitalsError>> for NearbyHospitalsQuery {}

impl crate::cqrs::middleware::Query for NearbyHospitalsQuery {}

impl NearbyHospitalsQuery {
    pub fn validate(&self) -> Result<(), NearbyHospitalsError> {
        validate_coordinates(self.latitude, self.longitude)?;
        Ok(())
    }

    /// The radius actually searched: default when absent, clamped to bounds.
    pub fn effective_radius(&self) -> f64 {
        let radius = self.radius.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius.is_finite() {
            return DEFAULT_RADIUS_KM;
        }
        radius.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
    }
}

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * a.sqrt().asin()
}

/// Handles the nearby hospitals query
#[tracing::instrument(skip(pool), fields(lat = query.latitude, lon = query.longitude))]
pub async fn handle(
    pool: PgPool,
    query: NearbyHospitalsQuery,
) -> Result<Vec<NearbyHospital>, NearbyHospitalsError> {
    query.validate()?;

    let hospitals = sqlx::query_as::<_, NearbyHospital>(NEARBY_SQL)
        .bind(query.latitude)
        .bind(query.longitude)
        .bind(query.effective_radius())
        .bind(MAX_NEARBY_RESULTS)
        .fetch_all(&pool)
        .await?;

    Ok(hospitals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(radius: Option<f64>) -> NearbyHospitalsQuery {
        NearbyHospitalsQuery {
            latitude: 10.7769,
            longitude: 106.7009,
            radius,
        }
    }

    #[test]
    fn test_validation_rejects_out_of_range_coordinates() {
        let mut bad = query(None);
        bad.latitude = -90.5;
        assert!(matches!(
            bad.validate(),
            Err(NearbyHospitalsError::Coordinates(_))
        ));
    }

    #[test]
    fn test_effective_radius_default_and_clamping() {
        assert_eq!(query(None).effective_radius(), DEFAULT_RADIUS_KM);
        assert_eq!(query(Some(25.0)).effective_radius(), 25.0);
        assert_eq!(query(Some(0.1)).effective_radius(), MIN_RADIUS_KM);
        assert_eq!(query(Some(5000.0)).effective_radius(), MAX_RADIUS_KM);
        assert_eq!(query(Some(f64::NAN)).effective_radius(), DEFAULT_RADIUS_KM);
    }

    #[test]
    fn test_haversine_zero_distance() {
        let d = haversine_km(21.0285, 105.8542, 21.0285, 105.8542);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_haversine_hanoi_to_ho_chi_minh_city() {
        // Roughly 1,140-1,170 km apart.
        let d = haversine_km(21.0285, 105.8542, 10.7769, 106.7009);
        assert!((1100.0..1200.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = haversine_km(21.0285, 105.8542, 10.7769, 106.7009);
        let b = haversine_km(10.7769, 106.7009, 21.0285, 105.8542);
        assert!((a - b).abs() < 1e-9);
    }
}
