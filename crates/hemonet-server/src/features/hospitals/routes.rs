//! Hospital HTTP routes

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
    AddInventoryCommand, AddInventoryError, CreateHospitalCommand, CreateHospitalError,
    DeleteHospitalCommand, DeleteHospitalError, ReplaceInventoryCommand, ReplaceInventoryError,
    UpdateHospitalCommand, UpdateHospitalError,
};
use super::queries::{
    BloodSummaryError, BloodSummaryQuery, GetHospitalError, GetHospitalInventoryError,
    GetHospitalInventoryQuery, GetHospitalQuery, ListHospitalsError, ListHospitalsQuery,
    NearbyHospitalsError, NearbyHospitalsQuery,
};

pub fn hospitals_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_hospital).get(list_hospitals))
        .route("/nearby", get(nearby_hospitals))
        .route("/blood-summary", get(blood_summary))
        .route(
            "/:id",
            get(get_hospital).put(update_hospital).delete(delete_hospital),
        )
        .route(
            "/:id/blood-inventory",
            get(get_inventory).put(replace_inventory).post(add_inventory),
        )
}

#[tracing::instrument(skip(pool, command), fields(name = %command.name))]
async fn create_hospital(
    State(pool): State<PgPool>,
    Json(command): Json<CreateHospitalCommand>,
) -> Result<Response, HospitalApiError> {
    let hospital = super::commands::create::handle(pool, command).await?;

    tracing::info!(hospital_id = %hospital.id, "Hospital created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(hospital))).into_response())
}

#[tracing::instrument(skip(pool, query))]
async fn list_hospitals(
    State(pool): State<PgPool>,
    Query(query): Query<ListHospitalsQuery>,
) -> Result<Response, HospitalApiError> {
    let page = super::queries::list::handle(pool, query).await?;

    tracing::debug!(
        count = page.items.len(),
        total = page.pagination.total_records,
        "Hospitals listed via API"
    );

    let meta = json!({ "pagination": page.pagination });

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(page.items, meta)),
    )
        .into_response())
}

#[tracing::instrument(skip(pool))]
async fn nearby_hospitals(
    State(pool): State<PgPool>,
    Query(query): Query<NearbyHospitalsQuery>,
) -> Result<Response, HospitalApiError> {
    let hospitals = super::queries::nearby::handle(pool, query).await?;

    tracing::debug!(count = hospitals.len(), "Nearby hospitals listed via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(hospitals))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn blood_summary(State(pool): State<PgPool>) -> Result<Response, HospitalApiError> {
    let summary = super::queries::summary::handle(pool, BloodSummaryQuery::default()).await?;

    tracing::debug!(groups = summary.len(), "Blood summary computed via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}

#[tracing::instrument(skip(pool), fields(id = %id))]
async fn get_hospital(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, HospitalApiError> {
    let hospital = super::queries::get::handle(pool, GetHospitalQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(hospital))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(id = %id))]
async fn update_hospital(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    Json(mut command): Json<UpdateHospitalCommand>,
) -> Result<Response, HospitalApiError> {
    command.id = id;

    let hospital = super::commands::update::handle(pool, command).await?;

    tracing::info!(hospital_id = %hospital.id, "Hospital updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(hospital))).into_response())
}

#[tracing::instrument(skip(pool), fields(id = %id))]
async fn delete_hospital(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, HospitalApiError> {
    let response = super::commands::delete::handle(pool, DeleteHospitalCommand { id }).await?;

    tracing::info!(hospital_id = %response.id, "Hospital deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool), fields(id = %hospital_id))]
async fn get_inventory(
    State(pool): State<PgPool>,
    Path(hospital_id): Path<String>,
) -> Result<Response, HospitalApiError> {
    let inventory =
        super::queries::get_inventory::handle(pool, GetHospitalInventoryQuery { hospital_id })
            .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(inventory))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(id = %hospital_id))]
async fn replace_inventory(
    State(pool): State<PgPool>,
    Path(hospital_id): Path<String>,
    Json(mut command): Json<ReplaceInventoryCommand>,
) -> Result<Response, HospitalApiError> {
    command.hospital_id = hospital_id;

    let response = super::commands::replace_inventory::handle(pool, command).await?;

    tracing::info!(
        hospital_id = %response.hospital_id,
        items = response.items.len(),
        "Inventory replaced via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(id = %hospital_id))]
async fn add_inventory(
    State(pool): State<PgPool>,
    Path(hospital_id): Path<String>,
    Json(mut command): Json<AddInventoryCommand>,
) -> Result<Response, HospitalApiError> {
    command.hospital_id = hospital_id;

    let entry = super::commands::add_inventory::handle(pool, command).await?;

    tracing::info!(unit_id = %entry.id, "Inventory item added via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))).into_response())
}

#[derive(Debug)]
enum HospitalApiError {
    Create(CreateHospitalError),
    Update(UpdateHospitalError),
    Delete(DeleteHospitalError),
    Replace(ReplaceInventoryError),
    Add(AddInventoryError),
    Get(GetHospitalError),
    GetInventory(GetHospitalInventoryError),
    List(ListHospitalsError),
    Nearby(NearbyHospitalsError),
    Summary(BloodSummaryError),
}

impl From<CreateHospitalError> for HospitalApiError {
    fn from(err: CreateHospitalError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateHospitalError> for HospitalApiError {
    fn from(err: UpdateHospitalError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteHospitalError> for HospitalApiError {
    fn from(err: DeleteHospitalError) -> Self {
        Self::Delete(err)
    }
}

impl From<ReplaceInventoryError> for HospitalApiError {
    fn from(err: ReplaceInventoryError) -> Self {
        Self::Replace(err)
    }
}

impl From<AddInventoryError> for HospitalApiError {
    fn from(err: AddInventoryError) -> Self {
        Self::Add(err)
    }
}

impl From<GetHospitalError> for HospitalApiError {
    fn from(err: GetHospitalError) -> Self {
        Self::Get(err)
    }
}

impl From<GetHospitalInventoryError> for HospitalApiError {
    fn from(err: GetHospitalInventoryError) -> Self {
        Self::GetInventory(err)
    }
}

impl From<ListHospitalsError> for HospitalApiError {
    fn from(err: ListHospitalsError) -> Self {
        Self::List(err)
    }
}

impl From<NearbyHospitalsError> for HospitalApiError {
    fn from(err: NearbyHospitalsError) -> Self {
        Self::Nearby(err)
    }
}

impl From<BloodSummaryError> for HospitalApiError {
    fn from(err: BloodSummaryError) -> Self {
        Self::Summary(err)
    }
}

impl IntoResponse for HospitalApiError {
    fn into_response(self) -> Response {
        match self {
            HospitalApiError::Create(err) => match err {
                CreateHospitalError::Duplicate { .. } => resp::conflict(err),
                CreateHospitalError::Database(_) => {
                    tracing::error!("Database error during hospital creation: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Update(err) => match err {
                UpdateHospitalError::NotFound(_) => resp::not_found(err),
                UpdateHospitalError::Duplicate => resp::conflict(err),
                UpdateHospitalError::Database(_) => {
                    tracing::error!("Database error during hospital update: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Delete(err) => match err {
                DeleteHospitalError::NotFound(_) => resp::not_found(err),
                DeleteHospitalError::Database(_) => {
                    tracing::error!("Database error during hospital deletion: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Replace(err) => match err {
                ReplaceInventoryError::HospitalNotFound(_) => resp::not_found(err),
                ReplaceInventoryError::Database(_) => {
                    tracing::error!("Database error during inventory replace: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Add(err) => match err {
                AddInventoryError::HospitalNotFound(_) => resp::not_found(err),
                AddInventoryError::Database(_) => {
                    tracing::error!("Database error during inventory add: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Get(err) => match err {
                GetHospitalError::NotFound(_) => resp::not_found(err),
                GetHospitalError::Database(_) => {
                    tracing::error!("Database error during hospital retrieval: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::GetInventory(err) => match err {
                GetHospitalInventoryError::NotFound(_) => resp::not_found(err),
                GetHospitalInventoryError::Database(_) => {
                    tracing::error!("Database error during inventory retrieval: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::List(err) => match err {
                ListHospitalsError::Database(_) => {
                    tracing::error!("Database error during hospital listing: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Nearby(err) => match err {
                NearbyHospitalsError::Database(_) => {
                    tracing::error!("Database error during nearby search: {}", err);
                    resp::internal_error()
                }
                other => resp::validation_error(other),
            },
            HospitalApiError::Summary(err) => match err {
                BloodSummaryError::Database(_) => {
                    tracing::error!("Database error during blood summary: {}", err);
                    resp::internal_error()
                }
            },
        }
    }
}
