//! Post repository
//!
//! Database operations for posts. The `checklist` snapshot and `likes` are
//! stored as JSON text.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Post, PostWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Username reported for posts whose author no longer resolves
pub const UNKNOWN_AUTHOR: &str = "User";

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// List all posts in store order
    async fn list(&self) -> Result<Vec<Post>>;

    /// List all posts joined with their author's username
    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>>;

    /// Update title, description and checklist snapshot
    async fn update(&self, post: &Post) -> Result<Post>;

    /// Write `likes` and `like_count` together
    async fn update_likes(&self, post: &Post) -> Result<()>;

    /// Delete a post. Returns false if no such post existed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => create_post_sqlite(pool, post).await,
            Backend::Mysql(pool) => create_post_mysql(pool, post).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Post>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_post_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_post_by_id_mysql(pool, id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Post>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => list_posts_sqlite(pool).await,
            Backend::Mysql(pool) => list_posts_mysql(pool).await,
        }
    }

    async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => list_posts_with_authors_sqlite(pool).await,
            Backend::Mysql(pool) => list_posts_with_authors_mysql(pool).await,
        }
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => update_post_sqlite(pool, post).await,
            Backend::Mysql(pool) => update_post_mysql(pool, post).await,
        }
    }

    async fn update_likes(&self, post: &Post) -> Result<()> {
        let likes = serde_json::to_string(&post.likes).context("Failed to encode likes")?;
        let like_count = post.likes.len() as i64;
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                sqlx::query(UPDATE_LIKES)
                    .bind(&likes)
                    .bind(like_count)
                    .bind(Utc::now())
                    .bind(&post.id)
                    .execute(pool)
                    .await
                    .context("Failed to update likes")?;
            }
            Backend::Mysql(pool) => {
                sqlx::query(UPDATE_LIKES)
                    .bind(&likes)
                    .bind(like_count)
                    .bind(Utc::now())
                    .bind(&post.id)
                    .execute(pool)
                    .await
                    .context("Failed to update likes")?;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let sql = "DELETE FROM posts WHERE id = ?";
        let affected = match self.pool.backend()? {
            Backend::Sqlite(pool) => sqlx::query(sql)
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete post")?
                .rows_affected(),
            Backend::Mysql(pool) => sqlx::query(sql)
                .bind(id)
                .execute(pool)
                .await
                .context("Failed to delete post")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

const SELECT_POST: &str = r#"
    SELECT id, user_id, title, description, checklist, likes, like_count, is_public,
           created_at, updated_at
    FROM posts
"#;

const SELECT_POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.user_id, p.title, p.description, p.checklist, p.likes, p.like_count,
           p.is_public, p.created_at, p.updated_at, u.username
    FROM posts p
    LEFT JOIN users u ON u.id = p.user_id
    ORDER BY p.created_at ASC, p.id ASC
"#;

const INSERT_POST: &str = r#"
    INSERT INTO posts (id, user_id, title, description, checklist, likes, like_count, is_public,
                       created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_POST: &str = r#"
    UPDATE posts
    SET title = ?, description = ?, checklist = ?, updated_at = ?
    WHERE id = ?
"#;

const UPDATE_LIKES: &str = r#"
    UPDATE posts
    SET likes = ?, like_count = ?, updated_at = ?
    WHERE id = ?
"#;

/// JSON-encoded `(checklist, likes)` columns
fn encode_json_columns(post: &Post) -> Result<(String, String)> {
    let checklist = serde_json::to_string(&post.checklist).context("Failed to encode checklist")?;
    let likes = serde_json::to_string(&post.likes).context("Failed to encode likes")?;
    Ok((checklist, likes))
}

fn decode_json_column<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("Invalid JSON in posts.{}", column))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let (checklist, likes) = encode_json_columns(post)?;

    sqlx::query(INSERT_POST)
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&checklist)
        .bind(&likes)
        .bind(post.likes.len() as i64)
        .bind(post.is_public)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(pool)
        .await
        .context("Failed to create post")?;

    Ok(post.clone())
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_POST))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    row.as_ref().map(row_to_post_sqlite).transpose()
}

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<Post>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC, id ASC", SELECT_POST))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter().map(row_to_post_sqlite).collect()
}

async fn list_posts_with_authors_sqlite(pool: &SqlitePool) -> Result<Vec<PostWithAuthor>> {
    let rows = sqlx::query(SELECT_POST_WITH_AUTHOR)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter()
        .map(|row| {
            let username: Option<String> = row.get("username");
            Ok(PostWithAuthor {
                post: row_to_post_sqlite(row)?,
                username: username.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            })
        })
        .collect()
}

async fn update_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let (checklist, _) = encode_json_columns(post)?;

    sqlx::query(UPDATE_POST)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&checklist)
        .bind(Utc::now())
        .bind(&post.id)
        .execute(pool)
        .await
        .context("Failed to update post")?;

    get_post_by_id_sqlite(pool, &post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let checklist: String = row.get("checklist");
    let likes: String = row.get("likes");

    Ok(Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        checklist: decode_json_column(&checklist, "checklist")?,
        likes: decode_json_column(&likes, "likes")?,
        like_count: row.get("like_count"),
        is_public: row.get("is_public"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let (checklist, likes) = encode_json_columns(post)?;

    sqlx::query(INSERT_POST)
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&checklist)
        .bind(&likes)
        .bind(post.likes.len() as i64)
        .bind(post.is_public)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(pool)
        .await
        .context("Failed to create post")?;

    Ok(post.clone())
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_POST))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    row.as_ref().map(row_to_post_mysql).transpose()
}

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<Post>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC, id ASC", SELECT_POST))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter().map(row_to_post_mysql).collect()
}

async fn list_posts_with_authors_mysql(pool: &MySqlPool) -> Result<Vec<PostWithAuthor>> {
    let rows = sqlx::query(SELECT_POST_WITH_AUTHOR)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter()
        .map(|row| {
            let username: Option<String> = row.get("username");
            Ok(PostWithAuthor {
                post: row_to_post_mysql(row)?,
                username: username.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            })
        })
        .collect()
}

async fn update_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let (checklist, _) = encode_json_columns(post)?;

    sqlx::query(UPDATE_POST)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&checklist)
        .bind(Utc::now())
        .bind(&post.id)
        .execute(pool)
        .await
        .context("Failed to update post")?;

    get_post_by_id_mysql(pool, &post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    let checklist: String = row.get("checklist");
    let likes: String = row.get("likes");
    let like_count: i32 = row.get("like_count");

    Ok(Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        checklist: decode_json_column(&checklist, "checklist")?,
        likes: decode_json_column(&likes, "likes")?,
        like_count: like_count as i64,
        is_public: row.get("is_public"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
