//! Login sessions
//!
//! The session id doubles as the bearer token handed to the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token (UUID v4)
    pub id: String,
    /// Owner of the session
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Past `expires_at`; `validate_session` deletes such sessions on sight
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
