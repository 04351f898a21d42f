//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints of the Chi-Go backend:
//! - Place endpoints (`/api/places`, `/api/attractions`, `/api/restaurants`)
//! - User endpoints (`/api/users`) and authentication (`/auth`)
//! - Post endpoints (`/api/posts`)
//! - Checklist endpoints (`/api/checklists`)
//! - Admin endpoints (`/admin`)

pub mod admin;
pub mod auth;
pub mod checklists;
pub mod middleware;
pub mod places;
pub mod posts;
pub mod users;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the route tree
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/api/places", places::router())
        .nest("/api", places::listing_router())
        .nest("/api/users", users::router())
        .nest("/api/posts", posts::router())
        .nest("/api/checklists", checklists::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, config: &ServerConfig) -> anyhow::Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", config.cors_origin))?;

    // Credentials are allowed so the session cookie works cross-origin
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(build_api_router(state.clone())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
