//! User domain types.

use chrono::{DateTime, Utc};

use recipe_core::{Email, UserId};

/// An account (domain type).
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Lowercased, unique email address.
    pub email: Email,
    /// Optional display name (empty when unset).
    pub name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Inactive users cannot authenticate.
    pub is_active: bool,
    /// May use staff tooling.
    pub is_staff: bool,
    /// Has every permission.
    pub is_superuser: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.email.as_str())
    }
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// An API token; one per user.
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// 40 lowercase hex characters.
    pub key: String,
    /// Owner of the token.
    pub user_id: UserId,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}
