//! Admin API endpoints
//!
//! Every route here sits behind `require_auth` + `require_admin`:
//! - POST /admin/attractions, PUT/DELETE /admin/attractions/{id}
//! - POST /admin/restaurants, PUT/DELETE /admin/restaurants/{id}
//! - GET /admin/posts, DELETE /admin/posts/{id}
//! - GET /admin/users, PUT/DELETE /admin/users/{id}
//!
//! Attraction and restaurant routes pin the category: creation ignores any
//! category in the body, and a place of the other category is not found.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::places::map_place_error;
use crate::api::{posts, users};
use crate::models::{CreatePlaceInput, Place, PlaceCategory, UpdatePlaceInput};

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attractions", post(create_attraction))
        .route("/attractions/{id}", put(update_attraction).delete(delete_attraction))
        .route("/restaurants", post(create_restaurant))
        .route("/restaurants/{id}", put(update_restaurant).delete(delete_restaurant))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/users", get(users::list_users))
        .route("/users/{id}", put(users::update_user).delete(users::delete_user))
}

/// POST /admin/attractions
async fn create_attraction(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Json(body): Json<CreatePlaceInput>,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    create_in_category(&state, &admin, body, PlaceCategory::Attraction).await
}

/// PUT /admin/attractions/{id}
async fn update_attraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePlaceInput>,
) -> Result<Json<Place>, ApiError> {
    update_in_category(&state, &id, body, PlaceCategory::Attraction).await
}

/// DELETE /admin/attractions/{id}
async fn delete_attraction(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_in_category(&state, &admin, &id, PlaceCategory::Attraction).await
}

/// POST /admin/restaurants
async fn create_restaurant(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Json(body): Json<CreatePlaceInput>,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    create_in_category(&state, &admin, body, PlaceCategory::Restaurant).await
}

/// PUT /admin/restaurants/{id}
async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePlaceInput>,
) -> Result<Json<Place>, ApiError> {
    update_in_category(&state, &id, body, PlaceCategory::Restaurant).await
}

/// DELETE /admin/restaurants/{id}
async fn delete_restaurant(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete_in_category(&state, &admin, &id, PlaceCategory::Restaurant).await
}

async fn create_in_category(
    state: &AppState,
    admin: &AuthenticatedUser,
    body: CreatePlaceInput,
    category: PlaceCategory,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    let place = state
        .place_service
        .create(body, Some(category))
        .await
        .map_err(map_place_error)?;

    tracing::info!("Admin {} created {} {}", admin.0.username, category, place.id);
    Ok((StatusCode::CREATED, Json(place)))
}

async fn update_in_category(
    state: &AppState,
    id: &str,
    body: UpdatePlaceInput,
    category: PlaceCategory,
) -> Result<Json<Place>, ApiError> {
    let place = state
        .place_service
        .update(id, body, Some(category))
        .await
        .map_err(map_place_error)?;
    Ok(Json(place))
}

async fn delete_in_category(
    state: &AppState,
    admin: &AuthenticatedUser,
    id: &str,
    category: PlaceCategory,
) -> Result<Json<Value>, ApiError> {
    state
        .place_service
        .delete(id, Some(category))
        .await
        .map_err(map_place_error)?;

    tracing::info!("Admin {} deleted {} {}", admin.0.username, category, id);
    Ok(Json(json!({ "success": true })))
}
