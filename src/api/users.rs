//! User API endpoints
//!
//! - GET /api/users - List users
//! - GET /api/users/count - Number of users
//! - PUT /api/users/{id} - Partial update
//! - DELETE /api/users/{id} - Delete user and their checklist
//!
//! The admin router mounts the same handlers under `/admin/users`.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{UpdateUserInput, User};
use crate::services::UserServiceError;

#[derive(Debug, Serialize)]
pub struct UserCountResponse {
    pub count: i64,
}

/// Build the user router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/count", get(count_users))
        .route("/{id}", put(update_user).delete(delete_user))
}

pub(super) fn map_user_error(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::NotFound(msg) => ApiError::not_found(format!("User not found: {}", msg)),
        UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        UserServiceError::UserExists(msg) => ApiError::conflict(msg),
        UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        UserServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
    }
}

/// GET /api/users
pub(super) async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.user_service.list().await.map_err(map_user_error)?;
    Ok(Json(users))
}

/// GET /api/users/count
async fn count_users(State(state): State<AppState>) -> Result<Json<UserCountResponse>, ApiError> {
    let count = state.user_service.count().await.map_err(map_user_error)?;
    Ok(Json(UserCountResponse { count }))
}

/// PUT /api/users/{id}
pub(super) async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserInput>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .user_service
        .update(&id, body)
        .await
        .map_err(map_user_error)?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// DELETE /api/users/{id}
pub(super) async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .user_service
        .delete(&id)
        .await
        .map_err(map_user_error)?;

    Ok(Json(json!({ "success": true })))
}
