//! Place API endpoints
//!
//! Handles HTTP requests for attractions and restaurants:
//! - GET /api/places - All places (flat fields)
//! - POST /api/places - Create a place
//! - PUT /api/places/{id} - Partial update
//! - DELETE /api/places/{id} - Delete a place
//! - GET /api/places/rankings - Most checklisted places per category
//! - GET /api/attractions - Attraction listing
//! - GET /api/restaurants - Restaurant listing

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    CreatePlaceInput, Place, PlaceCategory, PlaceListing, Rankings, UpdatePlaceInput,
};
use crate::services::PlaceServiceError;

/// Build the `/api/places` router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_places).post(create_place))
        .route("/rankings", get(get_rankings))
        .route("/{id}", put(update_place).delete(delete_place))
}

/// Category listings, mounted under `/api`
pub fn listing_router() -> Router<AppState> {
    Router::new()
        .route("/attractions", get(list_attractions))
        .route("/restaurants", get(list_restaurants))
}

pub(super) fn map_place_error(e: PlaceServiceError) -> ApiError {
    match e {
        PlaceServiceError::NotFound(id) => ApiError::not_found(format!("Place not found: {}", id)),
        PlaceServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        PlaceServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
    }
}

/// GET /api/places
async fn list_places(State(state): State<AppState>) -> Result<Json<Vec<Place>>, ApiError> {
    let places = state.place_service.list().await.map_err(map_place_error)?;
    Ok(Json(places))
}

/// POST /api/places
async fn create_place(
    State(state): State<AppState>,
    Json(body): Json<CreatePlaceInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let place = state
        .place_service
        .create(body, None)
        .await
        .map_err(map_place_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": place.id })),
    ))
}

/// PUT /api/places/{id}
async fn update_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePlaceInput>,
) -> Result<Json<Value>, ApiError> {
    let place = state
        .place_service
        .update(&id, body, None)
        .await
        .map_err(map_place_error)?;

    Ok(Json(json!({ "success": true, "place": place })))
}

/// DELETE /api/places/{id}
async fn delete_place(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .place_service
        .delete(&id, None)
        .await
        .map_err(map_place_error)?;

    Ok(Json(json!({ "success": true })))
}

/// GET /api/places/rankings
async fn get_rankings(State(state): State<AppState>) -> Result<Json<Rankings>, ApiError> {
    let rankings = state.place_service.rankings().await.map_err(map_place_error)?;
    Ok(Json(rankings))
}

/// GET /api/attractions
async fn list_attractions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaceListing>>, ApiError> {
    list_category(&state, PlaceCategory::Attraction).await
}

/// GET /api/restaurants
async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaceListing>>, ApiError> {
    list_category(&state, PlaceCategory::Restaurant).await
}

async fn list_category(
    state: &AppState,
    category: PlaceCategory,
) -> Result<Json<Vec<PlaceListing>>, ApiError> {
    let places = state
        .place_service
        .list_by_category(category)
        .await
        .map_err(map_place_error)?;
    Ok(Json(places))
}
