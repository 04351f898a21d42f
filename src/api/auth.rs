//! Authentication API endpoints
//!
//! Handles HTTP requests for user authentication:
//! - POST /auth/register - User registration
//! - POST /auth/login - User login
//! - POST /auth/logout - User logout
//! - GET /auth/me - Get current user

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{extract_session_token, ApiError, AppState, AuthenticatedUser};
use crate::models::{LoginInput, RegisterInput, User};
use crate::services::{AuthSession, UserServiceError};

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /auth/register - User registration
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state
        .user_service
        .register(body)
        .await
        .map_err(|e| match e {
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            _ => ApiError::internal_error(e.to_string()),
        })?;

    let (headers, body) = session_response(auth)?;
    Ok((StatusCode::CREATED, headers, body))
}

/// POST /auth/login - User login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state
        .user_service
        .login(body)
        .await
        .map_err(|e| match e {
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            _ => ApiError::internal_error(e.to_string()),
        })?;

    session_response(auth)
}

/// POST /auth/logout - User logout
///
/// Requires authentication.
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_session_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state
        .user_service
        .logout(&token)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /auth/me - Get current user
///
/// Requires authentication.
async fn get_current_user(user: AuthenticatedUser) -> Json<User> {
    Json(user.0)
}

/// Session cookie plus the `{user, token}` body
fn session_response(auth: AuthSession) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let max_age = (auth.session.expires_at - auth.session.created_at).num_seconds();
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        auth.session.id, max_age
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal_error(format!("Invalid session cookie: {}", e)))?,
    );

    Ok((
        headers,
        Json(AuthResponse {
            user: auth.user,
            token: auth.session.id,
        }),
    ))
}
