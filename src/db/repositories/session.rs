//! Session repository
//!
//! Database operations for user sessions.
//!
//! This module provides:
//! - `SessionRepository` trait defining the interface for session data access
//! - `SqlxSessionRepository` implementing the trait for SQLite and MySQL

use crate::db::{Backend, DynDatabasePool};
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for a user
    async fn delete_by_user(&self, user_id: &str) -> Result<()>;

    /// Delete expired sessions
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => create_session_sqlite(pool, session).await,
            Backend::Mysql(pool) => create_session_mysql(pool, session).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_session_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_session_by_id_mysql(pool, id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let sql = "DELETE FROM sessions WHERE id = ?";
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                sqlx::query(sql).bind(id).execute(pool).await.context("Failed to delete session")?;
            }
            Backend::Mysql(pool) => {
                sqlx::query(sql).bind(id).execute(pool).await.context("Failed to delete session")?;
            }
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<()> {
        let sql = "DELETE FROM sessions WHERE user_id = ?";
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                sqlx::query(sql)
                    .bind(user_id)
                    .execute(pool)
                    .await
                    .context("Failed to delete user sessions")?;
            }
            Backend::Mysql(pool) => {
                sqlx::query(sql)
                    .bind(user_id)
                    .execute(pool)
                    .await
                    .context("Failed to delete user sessions")?;
            }
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let sql = "DELETE FROM sessions WHERE expires_at < ?";
        let now = Utc::now();
        let result = match self.pool.backend()? {
            Backend::Sqlite(pool) => sqlx::query(sql)
                .bind(now)
                .execute(pool)
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
            Backend::Mysql(pool) => sqlx::query(sql)
                .bind(now)
                .execute(pool)
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
        };
        Ok(result)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_session_sqlite(pool: &SqlitePool, session: &Session) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, expires_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_session_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, expires_at, created_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get session by ID")?;

    Ok(row.map(|row| Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_session_mysql(pool: &MySqlPool, session: &Session) -> Result<Session> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, expires_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_session_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, expires_at, created_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get session by ID")?;

    Ok(row.map(|row| Session {
        id: row.get("id"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};
    use chrono::Duration;
    use uuid::Uuid;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    // Sessions reference users through a foreign key
    async fn create_test_user(pool: &DynDatabasePool, name: &str) -> User {
        let user = User::new(
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
            UserRole::User,
        );
        SqlxUserRepository::new(pool.clone())
            .create(&user)
            .await
            .expect("Failed to create user")
    }

    fn create_test_session(user_id: &str, expires_in_days: i64) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            expires_at: now + Duration::days(expires_in_days),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;
        let session = create_test_session(&user.id, 7);

        repo.create(&session).await.expect("Failed to create session");
        let found = repo
            .get_by_id(&session.id)
            .await
            .expect("Failed to get session")
            .expect("Session not found");

        assert_eq!(found.user_id, user.id);
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;
        let session = create_test_session(&user.id, 7);
        repo.create(&session).await.expect("Failed to create session");

        repo.delete(&session.id).await.expect("Failed to delete session");

        assert!(repo.get_by_id(&session.id).await.expect("Query failed").is_none());
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let (pool, repo) = setup_test_repo().await;
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let a1 = create_test_session(&alice.id, 7);
        let a2 = create_test_session(&alice.id, 7);
        let b1 = create_test_session(&bob.id, 7);
        for s in [&a1, &a2, &b1] {
            repo.create(s).await.expect("Failed to create session");
        }

        repo.delete_by_user(&alice.id).await.expect("Failed to delete");

        assert!(repo.get_by_id(&a1.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&a2.id).await.unwrap().is_none());
        assert!(repo.get_by_id(&b1.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;
        let expired = create_test_session(&user.id, -1);
        let valid = create_test_session(&user.id, 7);
        repo.create(&expired).await.unwrap();
        repo.create(&valid).await.unwrap();

        let removed = repo.delete_expired().await.expect("Failed to delete expired");

        assert_eq!(removed, 1);
        assert!(repo.get_by_id(&valid.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sessions_removed_with_user() {
        let (pool, repo) = setup_test_repo().await;
        let user = create_test_user(&pool, "alice").await;
        let session = create_test_session(&user.id, 7);
        repo.create(&session).await.unwrap();

        SqlxUserRepository::new(pool.clone())
            .delete(&user.id)
            .await
            .expect("Failed to delete user");

        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());
    }
}
