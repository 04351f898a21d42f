//! Post API endpoints
//!
//! - GET /api/posts - Posts with their author's username
//! - POST /api/posts - Share a checklist
//! - PUT /api/posts/{id} - Partial update
//! - DELETE /api/posts/{id} - Delete a post
//! - POST /api/posts/{id}/like - Toggle a like

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreatePostInput, LikeInput, PostWithAuthor, UpdatePostInput};
use crate::services::{LikeState, PostServiceError};

/// Build the post router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/like", post(toggle_like))
}

pub(super) fn map_post_error(e: PostServiceError) -> ApiError {
    match e {
        PostServiceError::NotFound(msg) => ApiError::not_found(format!("{} not found", msg)),
        PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        PostServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
    }
}

/// GET /api/posts
pub(super) async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = state
        .post_service
        .list_with_authors()
        .await
        .map_err(map_post_error)?;
    Ok(Json(posts))
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let post = state
        .post_service
        .create(body)
        .await
        .map_err(map_post_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "post_id": post.id })),
    ))
}

/// PUT /api/posts/{id}
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePostInput>,
) -> Result<Json<Value>, ApiError> {
    let post = state
        .post_service
        .update(&id, body)
        .await
        .map_err(map_post_error)?;

    Ok(Json(json!({ "success": true, "post": post })))
}

/// DELETE /api/posts/{id}
pub(super) async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .post_service
        .delete(&id)
        .await
        .map_err(map_post_error)?;

    Ok(Json(json!({ "success": true })))
}

/// POST /api/posts/{id}/like
async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LikeInput>,
) -> Result<Json<LikeState>, ApiError> {
    let like = state
        .post_service
        .toggle_like(&id, body)
        .await
        .map_err(map_post_error)?;
    Ok(Json(like))
}
