//! Chi-Go - backend for a city guide

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chigo::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxChecklistRepository, SqlxPlaceRepository, SqlxPostRepository,
            SqlxSessionRepository, SqlxUserRepository,
        },
    },
    services::{ChecklistService, PlaceService, PostService, UserService},
};

/// How often expired sessions are purged
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chigo=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Chi-Go backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    // Initialize repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let place_repo = SqlxPlaceRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let checklist_repo = SqlxChecklistRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(
        UserService::new(user_repo.clone(), session_repo, checklist_repo.clone())
            .with_session_expiration(config.auth.session_expiration_days),
    );
    let place_service = Arc::new(PlaceService::new(place_repo, checklist_repo.clone()));
    let post_service = Arc::new(PostService::new(post_repo, user_repo));
    let checklist_service = Arc::new(ChecklistService::new(checklist_repo));

    // Purge expired sessions periodically
    {
        let user_service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                SESSION_CLEANUP_INTERVAL_SECS,
            ));
            loop {
                interval.tick().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!("Removed {} expired sessions", removed),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    let state = AppState {
        user_service,
        place_service,
        post_service,
        checklist_service,
    };

    // Build router
    let app = api::build_router(state, &config.server)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
