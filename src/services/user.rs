//! User service
//!
//! Implements business logic for accounts:
//! - Registration (the first account becomes admin)
//! - Login/logout with database-backed sessions
//! - Session validation for the auth middleware
//! - Listing, editing and deleting users

use crate::db::is_unique_violation;
use crate::db::repositories::{ChecklistRepository, SessionRepository, UserRepository};
use crate::models::{LoginInput, RegisterInput, Session, UpdateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
pub const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials or inactive account)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Account plus a freshly issued session
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub session: Session,
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    checklist_repo: Arc<dyn ChecklistRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        checklist_repo: Arc<dyn ChecklistRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            checklist_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Override how long issued sessions stay valid
    pub fn with_session_expiration(mut self, days: i64) -> Self {
        self.session_expiration_days = days;
        self
    }

    /// Register a new user and open a session for them.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username, email or password is missing
    /// - `UserExists` if username or email is already taken
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, UserServiceError> {
        let (username, email, password) = validate_register_input(input)?;

        if self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let role = if self.is_first_user().await? {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let password_hash = hash_password(&password).context("Failed to hash password")?;
        let user = self
            .user_repo
            .create(&User::new(username, email, password_hash, role))
            .await
            .map_err(|e| map_write_error(e, "Failed to create user"))?;

        tracing::info!("Registered user {} ({})", user.username, user.role);

        let session = self.create_session(&user.id).await?;
        Ok(AuthSession { user, session })
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username or password is missing
    /// - `AuthenticationError` for unknown user, wrong password or inactive account
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, UserServiceError> {
        let (username, password) = match (non_empty(input.username), input.password) {
            (Some(u), Some(p)) if !p.is_empty() => (u, p),
            _ => {
                return Err(UserServiceError::ValidationError(
                    "Missing username or password".to_string(),
                ))
            }
        };

        let invalid = || UserServiceError::AuthenticationError("Invalid username or password".to_string());

        let user = self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(invalid)?;

        if !verify_password(&password, &user.password_hash).context("Failed to verify password")? {
            return Err(invalid());
        }

        if !user.is_active {
            return Err(UserServiceError::AuthenticationError(
                "Account is inactive".to_string(),
            ));
        }

        let session = self.create_session(&user.id).await?;
        Ok(AuthSession { user, session })
    }

    /// Invalidate a session. Unknown tokens are ignored.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` for unknown or expired sessions and for inactive users.
    /// Expired sessions are removed on sight.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to remove expired session: {:#}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(&session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.filter(|u| u.is_active))
    }

    /// All users, oldest first
    pub async fn list(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.user_repo.list().await.context("Failed to list users")?)
    }

    /// Number of registered users
    pub async fn count(&self) -> Result<i64, UserServiceError> {
        Ok(self.user_repo.count().await.context("Failed to count users")?)
    }

    /// Whether no account exists yet
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        Ok(self.count().await? == 0)
    }

    /// Apply a partial update to a user.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `ValidationError` for an unknown role or an emptied username/email
    /// - `UserExists` if the new username or email belongs to someone else
    pub async fn update(&self, id: &str, input: UpdateUserInput) -> Result<User, UserServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;

        if let Some(username) = input.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(UserServiceError::ValidationError("Username cannot be empty".to_string()));
            }
            if username != user.username {
                if let Some(other) = self
                    .user_repo
                    .get_by_username(&username)
                    .await
                    .context("Failed to check username")?
                {
                    if other.id != user.id {
                        return Err(UserServiceError::UserExists(format!(
                            "Username '{}' is already taken",
                            username
                        )));
                    }
                }
            }
            user.username = username;
        }

        if let Some(email) = input.email {
            let email = email.trim().to_string();
            if email.is_empty() {
                return Err(UserServiceError::ValidationError("Email cannot be empty".to_string()));
            }
            if email != user.email {
                if let Some(other) = self
                    .user_repo
                    .get_by_email(&email)
                    .await
                    .context("Failed to check email")?
                {
                    if other.id != user.id {
                        return Err(UserServiceError::UserExists(format!(
                            "Email '{}' is already registered",
                            email
                        )));
                    }
                }
            }
            user.email = email;
        }

        if let Some(role) = input.role {
            user.role = UserRole::from_str(&role)
                .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;
        }
        if input.avatar.is_some() {
            user.avatar = input.avatar;
        }
        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }

        let user = self
            .user_repo
            .update(&user)
            .await
            .map_err(|e| map_write_error(e, "Failed to update user"))?;

        // Deactivated accounts lose their open sessions
        if !user.is_active {
            self.session_repo
                .delete_by_user(&user.id)
                .await
                .context("Failed to revoke sessions")?;
        }

        Ok(user)
    }

    /// Delete a user together with their checklist.
    ///
    /// Sessions and posts go with the user through the store's cascade.
    pub async fn delete(&self, id: &str) -> Result<(), UserServiceError> {
        let deleted = self.user_repo.delete(id).await.context("Failed to delete user")?;
        if !deleted {
            return Err(UserServiceError::NotFound(id.to_string()));
        }

        self.checklist_repo
            .delete_by_user(id)
            .await
            .context("Failed to delete checklist of removed user")?;

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Delete all expired sessions and return how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?)
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        Ok(self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?)
    }
}

/// A concurrent writer can take the username or email between the
/// uniqueness check and the write; the store's UNIQUE index catches it.
fn map_write_error(error: anyhow::Error, context: &'static str) -> UserServiceError {
    if is_unique_violation(&error) {
        UserServiceError::UserExists("Username or email is already taken".to_string())
    } else {
        UserServiceError::InternalError(error.context(context))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_register_input(
    input: RegisterInput,
) -> Result<(String, String, String), UserServiceError> {
    let missing = || UserServiceError::ValidationError("Missing required fields".to_string());

    let username = non_empty(input.username).ok_or_else(missing)?;
    let email = non_empty(input.email).ok_or_else(missing)?;
    let password = input.password.filter(|p| !p.is_empty()).ok_or_else(missing)?;

    if !email.contains('@') {
        return Err(UserServiceError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }

    Ok((username, email, password))
}
