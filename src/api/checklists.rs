//! Checklist API endpoints
//!
//! - GET /api/checklists - All stored checklists
//! - GET /api/checklists/{user_id} - One user's checklist (empty if none)
//! - POST /api/checklists/{user_id}/add - Add an item
//! - DELETE /api/checklists/{user_id}/remove - Remove an item

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Checklist, ChecklistItem, ChecklistView};
use crate::services::ChecklistServiceError;

/// Item keys for a removal, from the JSON body or the query string
#[derive(Debug, Default, Deserialize)]
pub struct RemoveItemParams {
    #[serde(rename = "itemId")]
    pub item_id: Option<String>,
    #[serde(rename = "itemType")]
    pub item_type: Option<String>,
}

/// Response of the add and remove endpoints
#[derive(Debug, Serialize)]
pub struct ChecklistUpdateResponse {
    pub success: bool,
    pub message: &'static str,
    pub items: Vec<ChecklistItem>,
}

/// Build the checklist router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_checklists))
        .route("/{user_id}", get(get_checklist))
        .route("/{user_id}/add", post(add_item))
        .route("/{user_id}/remove", delete(remove_item))
}

fn map_checklist_error(e: ChecklistServiceError) -> ApiError {
    match e {
        ChecklistServiceError::NotFound(_) => ApiError::not_found("Checklist not found"),
        ChecklistServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        ChecklistServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
    }
}

/// GET /api/checklists
async fn list_checklists(State(state): State<AppState>) -> Result<Json<Vec<Checklist>>, ApiError> {
    let checklists = state
        .checklist_service
        .list_checklists()
        .await
        .map_err(map_checklist_error)?;
    Ok(Json(checklists))
}

/// GET /api/checklists/{user_id}
async fn get_checklist(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ChecklistView>, ApiError> {
    let checklist = state
        .checklist_service
        .get_checklist(&user_id)
        .await
        .map_err(map_checklist_error)?;
    Ok(Json(checklist))
}

/// POST /api/checklists/{user_id}/add
async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ChecklistUpdateResponse>, ApiError> {
    let items = state
        .checklist_service
        .add_item(&user_id, body)
        .await
        .map_err(map_checklist_error)?;

    Ok(Json(ChecklistUpdateResponse {
        success: true,
        message: "Item added",
        items,
    }))
}

/// DELETE /api/checklists/{user_id}/remove
///
/// Keys present in the JSON body take precedence over query parameters.
async fn remove_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<RemoveItemParams>,
    body: Bytes,
) -> Result<Json<ChecklistUpdateResponse>, ApiError> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        RemoveItemParams::default()
    } else {
        serde_json::from_slice::<RemoveItemParams>(&body)
            .map_err(|e| ApiError::validation_error(format!("Invalid request body: {}", e)))?
    };

    let item_id = from_body.item_id.or(query.item_id);
    let item_type = from_body.item_type.or(query.item_type);

    let items = state
        .checklist_service
        .remove_item(&user_id, item_id.as_deref(), item_type.as_deref())
        .await
        .map_err(map_checklist_error)?;

    Ok(Json(ChecklistUpdateResponse {
        success: true,
        message: "Item removed",
        items,
    }))
}
