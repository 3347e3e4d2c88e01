//! # Flats API Handlers
//!
//! CRUD and filtered listing endpoints for flat listings. Each handler
//! translates the HTTP request into a single repository call.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::Confirmation;
use crate::error::{ApiError, ApiJson, ErrorBody};
use crate::filter::FlatFilterQuery;
use crate::models::{Flat, UpdateFlat};
use crate::repositories::FlatRepository;
use crate::server::AppState;

/// Create a new flat
#[utoipa::path(
    post,
    path = "/flats",
    request_body = Flat,
    responses(
        (status = 201, description = "Flat created", body = Flat),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "flats"
)]
pub async fn create_flat(
    State(state): State<AppState>,
    ApiJson(flat): ApiJson<Flat>,
) -> Result<(StatusCode, Json<Flat>), ApiError> {
    let repo = FlatRepository::new(&state.db);
    let created = repo.create(flat).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List all flats
#[utoipa::path(
    get,
    path = "/flats",
    responses(
        (status = 200, description = "List of flats", body = [Flat]),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "flats"
)]
pub async fn list_flats(State(state): State<AppState>) -> Result<Json<Vec<Flat>>, ApiError> {
    let repo = FlatRepository::new(&state.db);
    let flats = repo.list().await?;

    Ok(Json(flats))
}

/// List flats matching the query-parameter filters
#[utoipa::path(
    get,
    path = "/flats/filter",
    params(FlatFilterQuery),
    responses(
        (status = 200, description = "Matching flats", body = [Flat]),
        (status = 400, description = "Malformed numeric bound", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "flats"
)]
pub async fn filter_flats(
    State(state): State<AppState>,
    Query(query): Query<FlatFilterQuery>,
) -> Result<Json<Vec<Flat>>, ApiError> {
    let predicate = query.predicate()?;

    let repo = FlatRepository::new(&state.db);
    let flats = repo.find_filtered(predicate).await?;

    Ok(Json(flats))
}

/// Get a flat by id
#[utoipa::path(
    get,
    path = "/flats/{id}",
    params(("id" = String, Path, description = "Flat identifier")),
    responses(
        (status = 200, description = "Flat data", body = Flat),
        (status = 404, description = "Flat not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "flats"
)]
pub async fn get_flat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Flat>, ApiError> {
    let repo = FlatRepository::new(&state.db);
    let flat = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flat not found".to_string()))?;

    Ok(Json(flat))
}

/// Update a flat; fields absent from the body keep their prior values
#[utoipa::path(
    put,
    path = "/flats/{id}",
    params(("id" = String, Path, description = "Flat identifier")),
    request_body = UpdateFlat,
    responses(
        (status = 200, description = "Updated flat", body = Flat),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 404, description = "Flat not found", body = ErrorBody)
    ),
    tag = "flats"
)]
pub async fn update_flat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UpdateFlat>,
) -> Result<Json<Flat>, ApiError> {
    let repo = FlatRepository::new(&state.db);
    let flat = repo
        .update(&id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flat not found".to_string()))?;

    Ok(Json(flat))
}

/// Delete a flat
#[utoipa::path(
    delete,
    path = "/flats/{id}",
    params(("id" = String, Path, description = "Flat identifier")),
    responses(
        (status = 200, description = "Flat deleted", body = Confirmation),
        (status = 404, description = "Flat not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "flats"
)]
pub async fn delete_flat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let repo = FlatRepository::new(&state.db);
    if !repo.delete(&id).await? {
        return Err(ApiError::NotFound("Flat not found".to_string()));
    }

    Ok(Json(Confirmation {
        message: "Flat deleted successfully".to_string(),
    }))
}
