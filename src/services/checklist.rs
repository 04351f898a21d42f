//! Checklist service
//!
//! Add/remove merge logic for per-user checklists. Each read-modify-write of
//! a user's item list runs under that user's lock, so concurrent adds for the
//! same user cannot overwrite each other or race on the lazy creation.

use crate::db::repositories::ChecklistRepository;
use crate::models::{Checklist, ChecklistItem, ChecklistView};
use crate::services::locks::KeyedLocks;
use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;

/// Error types for checklist service operations
#[derive(Debug, thiserror::Error)]
pub enum ChecklistServiceError {
    /// No checklist stored for the user
    #[error("Checklist not found for user {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct ChecklistService {
    repo: Arc<dyn ChecklistRepository>,
    locks: KeyedLocks,
}

impl ChecklistService {
    pub fn new(repo: Arc<dyn ChecklistRepository>) -> Self {
        Self {
            repo,
            locks: KeyedLocks::new(),
        }
    }

    /// Add an item to the user's checklist, creating the checklist on first use.
    ///
    /// An item already present under the same `(itemId, itemType)` is left
    /// alone. Returns the resulting item list.
    pub async fn add_item(
        &self,
        user_id: &str,
        raw_item: Value,
    ) -> Result<Vec<ChecklistItem>, ChecklistServiceError> {
        let item = ChecklistItem::from_json(raw_item)
            .map_err(|e| ChecklistServiceError::ValidationError(e.to_string()))?;

        let _guard = self.locks.lock(user_id).await;

        let existing = self
            .repo
            .get_by_user(user_id)
            .await
            .context("Failed to load checklist")?;

        let (mut checklist, is_new) = match existing {
            Some(checklist) => (checklist, false),
            None => (Checklist::new(user_id), true),
        };

        let added = checklist.add_item(item);

        if is_new {
            self.repo
                .create(&checklist)
                .await
                .context("Failed to create checklist")?;
            tracing::debug!("Created checklist {} for user {}", checklist.id, user_id);
        } else {
            self.repo
                .update_items(&checklist)
                .await
                .context("Failed to save checklist")?;
        }

        if !added {
            tracing::debug!("Duplicate checklist item ignored for user {}", user_id);
        }

        Ok(checklist.items)
    }

    /// Remove every entry matching both keys.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no checklist, checked before the keys
    /// - `ValidationError` if either key is missing
    pub async fn remove_item(
        &self,
        user_id: &str,
        item_id: Option<&str>,
        item_type: Option<&str>,
    ) -> Result<Vec<ChecklistItem>, ChecklistServiceError> {
        let _guard = self.locks.lock(user_id).await;

        let mut checklist = self
            .repo
            .get_by_user(user_id)
            .await
            .context("Failed to load checklist")?
            .ok_or_else(|| ChecklistServiceError::NotFound(user_id.to_string()))?;

        let (item_id, item_type) = match (item_id, item_type) {
            (Some(id), Some(ty)) if !id.is_empty() && !ty.is_empty() => (id, ty),
            _ => {
                return Err(ChecklistServiceError::ValidationError(
                    "itemId and itemType are required".to_string(),
                ))
            }
        };

        checklist.remove_item(item_id, item_type);
        self.repo
            .update_items(&checklist)
            .await
            .context("Failed to save checklist")?;

        Ok(checklist.items)
    }

    /// The user's checklist, or an empty placeholder when none is stored
    pub async fn get_checklist(&self, user_id: &str) -> Result<ChecklistView, ChecklistServiceError> {
        let checklist = self
            .repo
            .get_by_user(user_id)
            .await
            .context("Failed to load checklist")?;

        Ok(match checklist {
            Some(checklist) => ChecklistView::from(checklist),
            None => ChecklistView::empty(user_id),
        })
    }

    /// Every stored checklist
    pub async fn list_checklists(&self) -> Result<Vec<Checklist>, ChecklistServiceError> {
        Ok(self.repo.list().await.context("Failed to list checklists")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxChecklistRepository;
    use crate::db::{create_test_pool, migrations};
    use serde_json::json;

    async fn setup_test_service() -> Arc<ChecklistService> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        Arc::new(ChecklistService::new(SqlxChecklistRepository::boxed(pool)))
    }

    #[tokio::test]
    async fn test_add_creates_checklist_lazily() {
        let service = setup_test_service().await;

        let items = service
            .add_item("u1", json!({"itemId": "p1", "itemType": "attraction", "name": "Zoo"}))
            .await
            .expect("Failed to add item");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].extra["name"], "Zoo");

        let view = service.get_checklist("u1").await.unwrap();
        assert!(view.id.is_some());
        assert_eq!(view.items.len(), 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_keeps_one_entry() {
        let service = setup_test_service().await;
        let item = json!({"itemId": "p1", "itemType": "attraction"});

        service.add_item("u1", item.clone()).await.unwrap();
        let first = service.get_checklist("u1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let items = service.add_item("u1", item).await.unwrap();
        let second = service.get_checklist("u1").await.unwrap();

        assert_eq!(items.len(), 1);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn test_add_requires_keys() {
        let service = setup_test_service().await;

        let result = service.add_item("u1", json!({"itemId": "p1"})).await;

        assert!(matches!(result, Err(ChecklistServiceError::ValidationError(_))));
        assert!(service.get_checklist("u1").await.unwrap().id.is_none());
    }

    #[tokio::test]
    async fn test_remove_item() {
        let service = setup_test_service().await;
        service
            .add_item("u1", json!({"itemId": "p1", "itemType": "attraction"}))
            .await
            .unwrap();
        service
            .add_item("u1", json!({"itemId": "p2", "itemType": "restaurant"}))
            .await
            .unwrap();

        let unchanged = service
            .remove_item("u1", Some("p9"), Some("attraction"))
            .await
            .expect("Removing a missing item should succeed");
        assert_eq!(unchanged.len(), 2);

        let items = service
            .remove_item("u1", Some("p1"), Some("attraction"))
            .await
            .expect("Failed to remove");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_id, "p2");
    }

    #[tokio::test]
    async fn test_remove_without_checklist_is_not_found() {
        let service = setup_test_service().await;

        let result = service.remove_item("nobody", Some("p1"), Some("attraction")).await;
        assert!(matches!(result, Err(ChecklistServiceError::NotFound(_))));

        let no_keys = service.remove_item("nobody", None, None).await;
        assert!(matches!(no_keys, Err(ChecklistServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_requires_keys_on_existing_checklist() {
        let service = setup_test_service().await;
        service
            .add_item("u1", json!({"itemId": "p1", "itemType": "attraction"}))
            .await
            .unwrap();

        let missing = service.remove_item("u1", Some("p1"), None).await;
        assert!(matches!(missing, Err(ChecklistServiceError::ValidationError(_))));
        assert_eq!(service.get_checklist("u1").await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_get_checklist_placeholder() {
        let service = setup_test_service().await;

        let view = service.get_checklist("u1").await.expect("Should not fail");

        assert!(view.id.is_none());
        assert_eq!(view.user_id, "u1");
        assert!(view.items.is_empty());
        assert!(service.list_checklists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let service = setup_test_service().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .add_item("u1", json!({"itemId": format!("p{}", i), "itemType": "attraction"}))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("Task panicked").expect("Add failed");
        }

        let view = service.get_checklist("u1").await.unwrap();
        assert_eq!(view.items.len(), 8);
        assert_eq!(service.list_checklists().await.unwrap().len(), 1);
    }
}
