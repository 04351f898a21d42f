//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::db::{Backend, DynDatabasePool};
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update a user
    async fn update(&self, user: &User) -> Result<User>;

    /// Delete a user. Returns false if no such user existed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count total users
    async fn count(&self) -> Result<i64>;

    /// List all users, oldest first
    async fn list(&self) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => create_user_sqlite(pool, user).await,
            Backend::Mysql(pool) => create_user_mysql(pool, user).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_user_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_user_by_id_mysql(pool, id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_user_by_username_sqlite(pool, username).await,
            Backend::Mysql(pool) => get_user_by_username_mysql(pool, username).await,
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_user_by_email_sqlite(pool, email).await,
            Backend::Mysql(pool) => get_user_by_email_mysql(pool, email).await,
        }
    }

    async fn update(&self, user: &User) -> Result<User> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => update_user_sqlite(pool, user).await,
            Backend::Mysql(pool) => update_user_mysql(pool, user).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => delete_user_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_user_mysql(pool, id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => count_users_sqlite(pool).await,
            Backend::Mysql(pool) => count_users_mysql(pool).await,
        }
    }

    async fn list(&self) -> Result<Vec<User>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => list_users_sqlite(pool).await,
            Backend::Mysql(pool) => list_users_mysql(pool).await,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, password_hash, role, avatar, is_active, created_at, updated_at
    FROM users
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, avatar, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(&user.avatar)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(user.clone())
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn get_user_by_email_sqlite(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE email = ?", SELECT_USER))
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn update_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, role = ?, avatar = ?, is_active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(&user.avatar)
    .bind(user.is_active)
    .bind(now)
    .bind(&user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_id_sqlite(pool, &user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_sqlite(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn list_users_sqlite(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC", SELECT_USER))
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter().map(row_to_user_sqlite).collect()
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        avatar: row.get("avatar"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, avatar, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(&user.avatar)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(user.clone())
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

async fn get_user_by_email_mysql(pool: &MySqlPool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("{} WHERE email = ?", SELECT_USER))
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

async fn update_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, role = ?, avatar = ?, is_active = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(&user.avatar)
    .bind(user.is_active)
    .bind(now)
    .bind(&user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_id_mysql(pool, &user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_mysql(pool: &MySqlPool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

async fn count_users_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn list_users_mysql(pool: &MySqlPool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC", SELECT_USER))
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter().map(row_to_user_mysql).collect()
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        avatar: row.get("avatar"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn create_test_user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            "hashed".to_string(),
            UserRole::User,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (_pool, repo) = setup_test_repo().await;
        let user = create_test_user("testuser", "test@example.com");

        let created = repo.create(&user).await.expect("Failed to create user");
        assert_eq!(created.id, user.id);

        let found = repo
            .get_by_id(&user.id)
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.username, "testuser");
        assert_eq!(found.role, UserRole::User);
        assert!(found.is_active);
        assert!(found.avatar.is_none());
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id("missing").await.expect("Failed to get user");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&create_test_user("alice", "alice@example.com"))
            .await
            .expect("Failed to create user");

        let by_name = repo.get_by_username("alice").await.expect("Query failed");
        let by_email = repo.get_by_email("alice@example.com").await.expect("Query failed");

        assert!(by_name.is_some());
        assert_eq!(by_email.map(|u| u.username), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&create_test_user("alice", "a@example.com"))
            .await
            .expect("Failed to create user");

        let result = repo.create(&create_test_user("alice", "b@example.com")).await;

        assert!(result.is_err());
        assert_eq!(repo.count().await.expect("Failed to count"), 1);
    }

    #[tokio::test]
    async fn test_update_user() {
        let (_pool, repo) = setup_test_repo().await;
        let mut user = repo
            .create(&create_test_user("alice", "a@example.com"))
            .await
            .expect("Failed to create user");

        user.role = UserRole::Admin;
        user.avatar = Some("https://img.example.com/a.png".to_string());
        user.is_active = false;
        let updated = repo.update(&user).await.expect("Failed to update user");

        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.avatar.as_deref(), Some("https://img.example.com/a.png"));
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (_pool, repo) = setup_test_repo().await;
        let user = repo
            .create(&create_test_user("alice", "a@example.com"))
            .await
            .expect("Failed to create user");

        assert!(repo.delete(&user.id).await.expect("Failed to delete"));
        assert!(!repo.delete(&user.id).await.expect("Failed to delete"));
        assert!(repo.get_by_id(&user.id).await.expect("Query failed").is_none());
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let (_pool, repo) = setup_test_repo().await;
        for i in 0..3 {
            repo.create(&create_test_user(&format!("user{}", i), &format!("user{}@example.com", i)))
                .await
                .expect("Failed to create user");
        }

        assert_eq!(repo.count().await.expect("Failed to count"), 3);
        assert_eq!(repo.list().await.expect("Failed to list").len(), 3);
    }
}
