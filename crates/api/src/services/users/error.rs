//! User service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// No email was supplied.
    #[error("users must have an email address")]
    MissingEmail,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] recipe_core::EmailError),

    /// An account with this email already exists.
    #[error("user already exists")]
    AlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email or password, or the account is inactive.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
