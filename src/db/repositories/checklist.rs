//! Checklist repository
//!
//! Database operations for per-user checklists. Items are stored as a JSON
//! array in a text column.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Checklist, ChecklistItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Checklist repository trait
#[async_trait]
pub trait ChecklistRepository: Send + Sync {
    /// Insert a new checklist. Fails if the user already has one.
    async fn create(&self, checklist: &Checklist) -> Result<Checklist>;

    /// Get the checklist owned by a user
    async fn get_by_user(&self, user_id: &str) -> Result<Option<Checklist>>;

    /// List every stored checklist
    async fn list(&self) -> Result<Vec<Checklist>>;

    /// Persist `items` and `updated_at`
    async fn update_items(&self, checklist: &Checklist) -> Result<()>;

    /// Delete the checklist owned by a user, if any
    async fn delete_by_user(&self, user_id: &str) -> Result<()>;
}

/// SQLx-based checklist repository implementation
pub struct SqlxChecklistRepository {
    pool: DynDatabasePool,
}

impl SqlxChecklistRepository {
    /// Create a new SQLx checklist repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ChecklistRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ChecklistRepository for SqlxChecklistRepository {
    async fn create(&self, checklist: &Checklist) -> Result<Checklist> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => create_checklist_sqlite(pool, checklist).await,
            Backend::Mysql(pool) => create_checklist_mysql(pool, checklist).await,
        }
    }

    async fn get_by_user(&self, user_id: &str) -> Result<Option<Checklist>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => get_checklist_by_user_sqlite(pool, user_id).await,
            Backend::Mysql(pool) => get_checklist_by_user_mysql(pool, user_id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Checklist>> {
        match self.pool.backend()? {
            Backend::Sqlite(pool) => list_checklists_sqlite(pool).await,
            Backend::Mysql(pool) => list_checklists_mysql(pool).await,
        }
    }

    async fn update_items(&self, checklist: &Checklist) -> Result<()> {
        let items = encode_items(&checklist.items)?;
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                sqlx::query(UPDATE_ITEMS)
                    .bind(&items)
                    .bind(checklist.updated_at)
                    .bind(&checklist.id)
                    .execute(pool)
                    .await
                    .context("Failed to update checklist items")?;
            }
            Backend::Mysql(pool) => {
                sqlx::query(UPDATE_ITEMS)
                    .bind(&items)
                    .bind(checklist.updated_at)
                    .bind(&checklist.id)
                    .execute(pool)
                    .await
                    .context("Failed to update checklist items")?;
            }
        }
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<()> {
        let sql = "DELETE FROM checklists WHERE user_id = ?";
        match self.pool.backend()? {
            Backend::Sqlite(pool) => {
                sqlx::query(sql)
                    .bind(user_id)
                    .execute(pool)
                    .await
                    .context("Failed to delete checklist")?;
            }
            Backend::Mysql(pool) => {
                sqlx::query(sql)
                    .bind(user_id)
                    .execute(pool)
                    .await
                    .context("Failed to delete checklist")?;
            }
        }
        Ok(())
    }
}

const SELECT_CHECKLIST: &str = r#"
    SELECT id, user_id, items, created_at, updated_at
    FROM checklists
"#;

const INSERT_CHECKLIST: &str = r#"
    INSERT INTO checklists (id, user_id, items, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?)
"#;

const UPDATE_ITEMS: &str = r#"
    UPDATE checklists
    SET items = ?, updated_at = ?
    WHERE id = ?
"#;

fn encode_items(items: &[ChecklistItem]) -> Result<String> {
    serde_json::to_string(items).context("Failed to encode checklist items")
}

fn decode_items(raw: &str) -> Result<Vec<ChecklistItem>> {
    serde_json::from_str(raw).context("Invalid JSON in checklists.items")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_checklist_sqlite(pool: &SqlitePool, checklist: &Checklist) -> Result<Checklist> {
    sqlx::query(INSERT_CHECKLIST)
        .bind(&checklist.id)
        .bind(&checklist.user_id)
        .bind(encode_items(&checklist.items)?)
        .bind(checklist.created_at)
        .bind(checklist.updated_at)
        .execute(pool)
        .await
        .context("Failed to create checklist")?;

    Ok(checklist.clone())
}

async fn get_checklist_by_user_sqlite(pool: &SqlitePool, user_id: &str) -> Result<Option<Checklist>> {
    let row = sqlx::query(&format!("{} WHERE user_id = ?", SELECT_CHECKLIST))
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get checklist by user")?;

    row.as_ref().map(row_to_checklist_sqlite).transpose()
}

async fn list_checklists_sqlite(pool: &SqlitePool) -> Result<Vec<Checklist>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC, id ASC", SELECT_CHECKLIST))
        .fetch_all(pool)
        .await
        .context("Failed to list checklists")?;

    rows.iter().map(row_to_checklist_sqlite).collect()
}

fn row_to_checklist_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Checklist> {
    let items: String = row.get("items");

    Ok(Checklist {
        id: row.get("id"),
        user_id: row.get("user_id"),
        items: decode_items(&items)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_checklist_mysql(pool: &MySqlPool, checklist: &Checklist) -> Result<Checklist> {
    sqlx::query(INSERT_CHECKLIST)
        .bind(&checklist.id)
        .bind(&checklist.user_id)
        .bind(encode_items(&checklist.items)?)
        .bind(checklist.created_at)
        .bind(checklist.updated_at)
        .execute(pool)
        .await
        .context("Failed to create checklist")?;

    Ok(checklist.clone())
}

async fn get_checklist_by_user_mysql(pool: &MySqlPool, user_id: &str) -> Result<Option<Checklist>> {
    let row = sqlx::query(&format!("{} WHERE user_id = ?", SELECT_CHECKLIST))
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get checklist by user")?;

    row.as_ref().map(row_to_checklist_mysql).transpose()
}

async fn list_checklists_mysql(pool: &MySqlPool) -> Result<Vec<Checklist>> {
    let rows = sqlx::query(&format!("{} ORDER BY created_at ASC, id ASC", SELECT_CHECKLIST))
        .fetch_all(pool)
        .await
        .context("Failed to list checklists")?;

    rows.iter().map(row_to_checklist_mysql).collect()
}

fn row_to_checklist_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Checklist> {
    let items: String = row.get("items");

    Ok(Checklist {
        id: row.get("id"),
        user_id: row.get("user_id"),
        items: decode_items(&items)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxChecklistRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxChecklistRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_checklist() {
        let repo = setup_test_repo().await;
        let checklist = Checklist::new("u1");

        repo.create(&checklist).await.expect("Failed to create checklist");
        let found = repo
            .get_by_user("u1")
            .await
            .expect("Failed to get checklist")
            .expect("Checklist not found");

        assert_eq!(found.id, checklist.id);
        assert!(found.items.is_empty());
        assert!(repo.get_by_user("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_one_checklist_per_user() {
        let repo = setup_test_repo().await;
        repo.create(&Checklist::new("u1")).await.expect("Failed to create checklist");

        assert!(repo.create(&Checklist::new("u1")).await.is_err());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_items_roundtrips_extra_fields() {
        let repo = setup_test_repo().await;
        let mut checklist = repo.create(&Checklist::new("u1")).await.unwrap();

        let mut item = ChecklistItem::new("p1", "attraction");
        item.extra.insert("name".to_string(), serde_json::json!("Zoo"));
        checklist.add_item(item.clone());
        repo.update_items(&checklist).await.expect("Failed to update items");

        let found = repo.get_by_user("u1").await.unwrap().unwrap();
        assert_eq!(found.items, vec![item]);
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let repo = setup_test_repo().await;
        repo.create(&Checklist::new("u1")).await.unwrap();
        repo.create(&Checklist::new("u2")).await.unwrap();

        repo.delete_by_user("u1").await.expect("Failed to delete");

        assert!(repo.get_by_user("u1").await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
