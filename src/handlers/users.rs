//! # Users API Handlers
//!
//! CRUD, filtered listing and username search endpoints for roommate
//! profiles. Path lookups accept either the internal id or the external
//! `userId` key.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::Confirmation;
use crate::error::{ApiError, ApiJson, ErrorBody};
use crate::filter::UserFilterQuery;
use crate::models::{UpdateUser, User};
use crate::repositories::UserRepository;
use crate::server::AppState;

/// Create a new user profile
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Malformed body or duplicate userId", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(user): ApiJson<User>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let repo = UserRepository::new(&state.db);
    let created = repo.create(user).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List users, narrowed by any filter parameters present
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterQuery),
    responses(
        (status = 200, description = "Matching users", body = [User]),
        (status = 400, description = "Malformed numeric bound", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserFilterQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let predicate = query.predicate()?;

    let repo = UserRepository::new(&state.db);
    let users = repo.find_filtered(predicate).await?;

    Ok(Json(users))
}

/// Search users by username substring, case-insensitively
#[utoipa::path(
    get,
    path = "/api/users/search",
    params(("username" = String, Query, description = "Username fragment to search for")),
    responses(
        (status = 200, description = "Matching users", body = [User]),
        (status = 400, description = "Missing username parameter", body = ErrorBody),
        (status = 404, description = "No users matched", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let username = params
        .get("username")
        .map(String::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("username query parameter is required".to_string()))?;

    let repo = UserRepository::new(&state.db);
    let users = repo.search_by_username(username).await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("No users found".to_string()));
    }

    Ok(Json(users))
}

/// Get a user by id or userId
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "Internal id or external userId")),
    responses(
        (status = 200, description = "User data", body = User),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let user = repo
        .find_by_key(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update a user; fields absent from the body keep their prior values
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "Internal id or external userId")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Malformed request body", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let user = repo
        .update(&id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "Internal id or external userId")),
    responses(
        (status = 200, description = "User deleted", body = Confirmation),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let repo = UserRepository::new(&state.db);
    if !repo.delete(&id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(Confirmation {
        message: "User deleted successfully".to_string(),
    }))
}
