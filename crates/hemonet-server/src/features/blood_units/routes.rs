//! Blood unit HTTP routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use crate::api::response::{self as resp, ApiResponse};

use super::commands::{
    CreateBloodUnitCommand, CreateBloodUnitError, DeleteBloodUnitCommand, DeleteBloodUnitError,
    RemoveExpiredCommand, RemoveExpiredError, UpdateBloodUnitCommand, UpdateBloodUnitError,
};
use super::queries::{
    GetBloodUnitError, GetBloodUnitQuery, ListBloodUnitsError, ListBloodUnitsQuery,
    ListByHospitalError, ListByHospitalQuery,
};

pub fn blood_units_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_blood_unit).get(list_blood_units))
        .route("/remove-expired", post(remove_expired))
        .route("/hospital/:hospital_id", get(list_by_hospital))
        .route(
            "/:id",
            get(get_blood_unit)
                .patch(update_blood_unit)
                .delete(delete_blood_unit),
        )
}

#[tracing::instrument(skip(pool, command), fields(hospital_id = %command.hospital_id))]
async fn create_blood_unit(
    State(pool): State<PgPool>,
    Json(command): Json<CreateBloodUnitCommand>,
) -> Result<Response, BloodUnitApiError> {
    let unit = super::commands::create::handle(pool, command).await?;

    tracing::info!(unit_id = %unit.id, "Blood unit created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(unit))).into_response())
}

#[tracing::instrument(skip(pool, query), fields(page = ?query.page.page, limit = ?query.page.limit))]
async fn list_blood_units(
    State(pool): State<PgPool>,
    Query(query): Query<ListBloodUnitsQuery>,
) -> Result<Response, BloodUnitApiError> {
    let page = super::queries::list::handle(pool, query).await?;

    tracing::debug!(
        count = page.items.len(),
        total = page.pagination.total_records,
        "Blood units listed via API"
    );

    let meta = json!({ "pagination": page.pagination });

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(page.items, meta)),
    )
        .into_response())
}

#[tracing::instrument(skip(pool))]
async fn remove_expired(State(pool): State<PgPool>) -> Result<Response, BloodUnitApiError> {
    let response =
        super::commands::remove_expired::handle(pool, RemoveExpiredCommand::default()).await?;

    tracing::info!(removed = response.removed, "Expiry sweep run via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool), fields(hospital_id = %hospital_id))]
async fn list_by_hospital(
    State(pool): State<PgPool>,
    Path(hospital_id): Path<String>,
) -> Result<Response, BloodUnitApiError> {
    let units =
        super::queries::list_by_hospital::handle(pool, ListByHospitalQuery { hospital_id })
            .await?;

    tracing::debug!(count = units.len(), "Hospital blood units listed via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(units))).into_response())
}

#[tracing::instrument(skip(pool), fields(id = %id))]
async fn get_blood_unit(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, BloodUnitApiError> {
    let unit = super::queries::get::handle(pool, GetBloodUnitQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(unit))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(id = %id))]
async fn update_blood_unit(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    Json(mut command): Json<UpdateBloodUnitCommand>,
) -> Result<Response, BloodUnitApiError> {
    command.id = id;

    let unit = super::commands::update::handle(pool, command).await?;

    tracing::info!(unit_id = %unit.id, "Blood unit updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(unit))).into_response())
}

#[tracing::instrument(skip(pool), fields(id = %id))]
async fn delete_blood_unit(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, BloodUnitApiError> {
    let response = super::commands::delete::handle(pool, DeleteBloodUnitCommand { id }).await?;

    tracing::info!(unit_id = %response.id, "Blood unit deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum BloodUnitApiError {
    Create(CreateBloodUnitError),
    Update(UpdateBloodUnitError),
    Delete(DeleteBloodUnitError),
    RemoveExpired(RemoveExpiredError),
    Get(GetBloodUnitError),
    List(ListBloodUnitsError),
    ListByHospital(ListByHospitalError),
}

impl From<CreateBloodUnitError> for BloodUnitApiError {
    fn from(err: CreateBloodUnitError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateBloodUnitError> for BloodUnitApiError {
    fn from(err: UpdateBloodUnitError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteBloodUnitError> for BloodUnitApiError {
    fn from(err: DeleteBloodUnitError) -> Self {
        Self::Delete(err)
    }
}

impl From<RemoveExpiredError> for BloodUnitApiError {
    fn from(err: RemoveExpiredError) -> Self {
        Self::RemoveExpired(err)
    }
}

impl From<GetBloodUnitError> for BloodUnitApiError {
    fn from(err: GetBloodUnitError) -> Self {
        Self::Get(err)
    }
}

impl From<ListBloodUnitsError> for BloodUnitApiError {
    fn from(err: ListBloodUnitsError) -> Self {
        Self::List(err)
    }
}

impl From<ListByHospitalError> for BloodUnitApiError {
    fn from(err: ListByHospitalError) -> Self {
        Self::ListByHospital(err)
    }
}

impl IntoResponse for BloodUnitApiError {
    fn into_response(self) -> Response {
        match self {
            BloodUnitApiError::Create(err) => match err {
                CreateBloodUnitError::HospitalNotFound(_) => resp::not_found(err),
                CreateBloodUnitError::Database(_) => {
                    tracing::error!("Database error during blood unit creation: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            BloodUnitApiError::Update(err) => match err {
                UpdateBloodUnitError::NotFound(_) | UpdateBloodUnitError::HospitalNotFound(_) => {
                    resp::not_found(err)
                }
                UpdateBloodUnitError::Database(_) => {
                    tracing::error!("Database error during blood unit update: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            BloodUnitApiError::Delete(err) => match err {
                DeleteBloodUnitError::NotFound(_) => resp::not_found(err),
                DeleteBloodUnitError::Database(_) => {
                    tracing::error!("Database error during blood unit deletion: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            BloodUnitApiError::RemoveExpired(err) => match err {
                RemoveExpiredError::Database(_) => {
                    tracing::error!("Database error during expiry sweep: {}", err);
                    resp::internal_error()
                }
            },
            BloodUnitApiError::Get(err) => match err {
                GetBloodUnitError::NotFound(_) => resp::not_found(err),
                GetBloodUnitError::Database(_) => {
                    tracing::error!("Database error during blood unit retrieval: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            BloodUnitApiError::List(err) => match err {
                ListBloodUnitsError::Database(_) => {
                    tracing::error!("Database error during blood unit listing: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            BloodUnitApiError::ListByHospital(err) => match err {
                ListByHospitalError::HospitalNotFound(_) => resp::not_found(err),
                ListByHospitalError::Database(_) => {
                    tracing::error!("Database error during hospital unit listing: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
        }
    }
}
