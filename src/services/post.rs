//! Post service
//!
//! Shared checklists ("posts") and their likes.

use crate::db::repositories::{PostRepository, UserRepository};
use crate::models::{CreatePostInput, LikeInput, Post, PostWithAuthor, UpdatePostInput};
use crate::services::locks::KeyedLocks;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post (or its author) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    user_repo: Arc<dyn UserRepository>,
    /// Held per post around each read-modify-write
    locks: KeyedLocks,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
            user_repo,
            locks: KeyedLocks::new(),
        }
    }

    /// Create a post. The checklist snapshot is stored exactly as sent.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if `user_id` or `title` is missing
    /// - `NotFound` if the author does not exist
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        let user_id = input
            .user_id
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PostServiceError::ValidationError("user_id is required".to_string()))?;
        let title = input
            .title
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PostServiceError::ValidationError("title is required".to_string()))?;

        if self
            .user_repo
            .get_by_id(&user_id)
            .await
            .context("Failed to check post author")?
            .is_none()
        {
            return Err(PostServiceError::NotFound(format!("User {}", user_id)));
        }

        let post = Post::new(
            user_id,
            title,
            input.description,
            input.checklist.unwrap_or_default(),
        );
        Ok(self.repo.create(&post).await.context("Failed to create post")?)
    }

    /// All posts with their author's username
    pub async fn list_with_authors(&self) -> Result<Vec<PostWithAuthor>, PostServiceError> {
        Ok(self
            .repo
            .list_with_authors()
            .await
            .context("Failed to list posts")?)
    }

    /// All posts, without author lookup
    pub async fn list(&self) -> Result<Vec<Post>, PostServiceError> {
        Ok(self.repo.list().await.context("Failed to list posts")?)
    }

    pub async fn update(&self, id: &str, input: UpdatePostInput) -> Result<Post, PostServiceError> {
        let _guard = self.locks.lock(id).await;
        let mut post = self.get(id).await?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(PostServiceError::ValidationError("title cannot be empty".to_string()));
            }
            post.title = title;
        }
        if input.description.is_some() {
            post.description = input.description;
        }
        if let Some(checklist) = input.checklist {
            post.checklist = checklist;
        }

        Ok(self.repo.update(&post).await.context("Failed to update post")?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), PostServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete post")? {
            return Err(PostServiceError::NotFound(format!("Post {}", id)));
        }
        Ok(())
    }

    /// Like the post, or unlike it if the user already liked it.
    ///
    /// Toggles on the same post run one at a time so no like is lost.
    pub async fn toggle_like(&self, id: &str, input: LikeInput) -> Result<LikeState, PostServiceError> {
        let user_id = input
            .user_id
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PostServiceError::ValidationError("user_id is required".to_string()))?;

        let _guard = self.locks.lock(id).await;
        let mut post = self.get(id).await?;
        let liked = post.toggle_like(&user_id);
        self.repo
            .update_likes(&post)
            .await
            .context("Failed to update likes")?;

        Ok(LikeState {
            liked,
            like_count: post.like_count,
        })
    }

    async fn get(&self, id: &str) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxPostRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};
    use serde_json::json;

    async fn setup_test_service() -> (PostService, User) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let author = user_repo
            .create(&User::new(
                "alice".to_string(),
                "alice@example.com".to_string(),
                "hash".to_string(),
                UserRole::User,
            ))
            .await
            .expect("Failed to create author");

        (PostService::new(SqlxPostRepository::boxed(pool), user_repo), author)
    }

    fn create_input(user_id: &str, title: &str) -> CreatePostInput {
        CreatePostInput {
            user_id: Some(user_id.to_string()),
            title: Some(title.to_string()),
            description: None,
            checklist: Some(vec![json!({"itemId": "p1", "itemType": "attraction"})]),
        }
    }

    #[tokio::test]
    async fn test_create_post() {
        let (service, author) = setup_test_service().await;

        let post = service
            .create(create_input(&author.id, "Weekend"))
            .await
            .expect("Failed to create post");

        assert_eq!(post.like_count, 0);
        assert!(post.likes.is_empty());
        assert_eq!(post.checklist.len(), 1);

        let listed = service.list_with_authors().await.unwrap();
        assert_eq!(listed[0].username, "alice");
    }

    #[tokio::test]
    async fn test_create_post_validation() {
        let (service, author) = setup_test_service().await;

        let mut no_title = create_input(&author.id, "x");
        no_title.title = None;
        assert!(matches!(
            service.create(no_title).await,
            Err(PostServiceError::ValidationError(_))
        ));

        assert!(matches!(
            service.create(create_input("ghost", "Trip")).await,
            Err(PostServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_post() {
        let (service, author) = setup_test_service().await;
        let post = service.create(create_input(&author.id, "Weekend")).await.unwrap();

        let updated = service
            .update(
                &post.id,
                UpdatePostInput {
                    description: Some("Two days".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to update");

        assert_eq!(updated.title, "Weekend");
        assert_eq!(updated.description.as_deref(), Some("Two days"));
        assert_eq!(updated.checklist.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_like() {
        let (service, author) = setup_test_service().await;
        let post = service.create(create_input(&author.id, "Weekend")).await.unwrap();
        let like = |user: &str| LikeInput { user_id: Some(user.to_string()) };

        let first = service.toggle_like(&post.id, like("u2")).await.unwrap();
        assert!(first.liked);
        assert_eq!(first.like_count, 1);

        let second = service.toggle_like(&post.id, like("u2")).await.unwrap();
        assert!(!second.liked);
        assert_eq!(second.like_count, 0);

        assert!(matches!(
            service.toggle_like("missing", like("u2")).await,
            Err(PostServiceError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_likes_are_not_lost() {
        let (service, author) = setup_test_service().await;
        let service = Arc::new(service);
        let post = service.create(create_input(&author.id, "Weekend")).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                let post_id = post.id.clone();
                tokio::spawn(async move {
                    service
                        .toggle_like(&post_id, LikeInput { user_id: Some(format!("u{}", i)) })
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("Task panicked").expect("Like failed");
        }

        let stored = service.list().await.unwrap().remove(0);
        assert_eq!(stored.likes.len(), 8);
        assert_eq!(stored.like_count, 8);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (service, author) = setup_test_service().await;
        let post = service.create(create_input(&author.id, "Weekend")).await.unwrap();

        service.delete(&post.id).await.expect("Failed to delete");

        assert!(service.list().await.unwrap().is_empty());
        assert!(matches!(
            service.delete(&post.id).await,
            Err(PostServiceError::NotFound(_))
        ));
    }
}
