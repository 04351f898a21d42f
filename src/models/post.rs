//! Post model
//!
//! A post shares a snapshot of a checklist. The `checklist` field is copied
//! from the request at creation time and never follows later edits to the
//! author's live checklist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Author user ID
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Item references as sent by the client
    pub checklist: Vec<Value>,
    /// IDs of users who liked the post
    pub likes: Vec<String>,
    /// Always `likes.len()`
    pub like_count: i64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        user_id: String,
        title: String,
        description: Option<String>,
        checklist: Vec<Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            description,
            checklist,
            likes: Vec::new(),
            like_count: 0,
            is_public: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add or remove `user_id` from the likes.
    ///
    /// Returns true if the post is liked by the user afterwards.
    pub fn toggle_like(&mut self, user_id: &str) -> bool {
        let liked = match self.likes.iter().position(|id| id == user_id) {
            Some(idx) => {
                self.likes.remove(idx);
                false
            }
            None => {
                self.likes.push(user_id.to_string());
                true
            }
        };
        self.like_count = self.likes.len() as i64;
        liked
    }
}

/// Post with its author's username, as listed by `GET /api/posts`
#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostInput {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub checklist: Option<Vec<Value>>,
}

/// Partial update of a post; likes are only changed through the like toggle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub checklist: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikeInput {
    pub user_id: Option<String>,
}
