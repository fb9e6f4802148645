//! Database operations for the recipe API.
//!
//! # Tables
//!
//! - `app_user` - Accounts (email, password hash, staff/superuser flags)
//! - `auth_token` - One API token per user
//! - `tag`, `ingredient` - User-owned labels
//! - `recipe`, `recipe_tag`, `recipe_ingredient` - Recipes and their links
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Repositories
//!
//! Handlers talk to storage through the repository traits below, bundled
//! as [`Store`]. [`PgStore`] is the production implementation; tests use
//! the in-memory `MemoryStore`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p recipe-cli -- migrate
//! ```

pub mod attributes;
#[cfg(test)]
pub mod memory;
pub mod recipes;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use recipe_core::{Email, Name, RecipeId, UserId};

use crate::models::{AuthToken, Ingredient, NewRecipe, NewUser, Recipe, Tag, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced record does not exist or belongs to another user.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

/// Map a unique violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Account and token storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Get a user by their ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user by their (normalized) email.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Update the display name and/or password hash.
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    async fn update_user(
        &self,
        id: UserId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, RepositoryError>;

    /// Get the token issued to a user, if any.
    async fn get_token(&self, user_id: UserId) -> Result<Option<AuthToken>, RepositoryError>;

    /// Store a token for a user.
    ///
    /// Returns `RepositoryError::Conflict` if the user already has one.
    async fn create_token(&self, user_id: UserId, key: &str)
    -> Result<AuthToken, RepositoryError>;

    /// Get the user owning a token.
    async fn get_user_by_token(&self, key: &str) -> Result<Option<User>, RepositoryError>;
}

/// Tag storage, always scoped to an owner.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// The owner's tags, by name descending.
    async fn list_tags(&self, owner: UserId) -> Result<Vec<Tag>, RepositoryError>;

    /// Create a tag for the owner.
    async fn create_tag(&self, owner: UserId, name: &Name) -> Result<Tag, RepositoryError>;
}

/// Ingredient storage, always scoped to an owner.
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// The owner's ingredients, by name descending.
    async fn list_ingredients(&self, owner: UserId) -> Result<Vec<Ingredient>, RepositoryError>;

    /// Create an ingredient for the owner.
    async fn create_ingredient(
        &self,
        owner: UserId,
        name: &Name,
    ) -> Result<Ingredient, RepositoryError>;
}

/// Recipe storage, always scoped to an owner.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// The owner's recipes, newest (highest id) first.
    async fn list_recipes(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError>;

    /// One of the owner's recipes.
    async fn get_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RepositoryError>;

    /// Create a recipe with its tag and ingredient links.
    ///
    /// Returns `RepositoryError::InvalidReference` if a linked tag or
    /// ingredient is missing or owned by someone else; nothing is stored
    /// in that case.
    async fn create_recipe(
        &self,
        owner: UserId,
        recipe: &NewRecipe,
    ) -> Result<Recipe, RepositoryError>;
}

/// Everything the HTTP layer needs from storage.
#[async_trait]
pub trait Store: UserRepository + TagRepository + IngredientRepository + RecipeRepository {
    /// Check that the backing storage answers.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` implementation of [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the API's SQL migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Ids in `wanted` that are absent from `found`, comma separated.
pub(crate) fn missing_ids<T: Copy + PartialEq + std::fmt::Display>(
    wanted: &[T],
    found: &[T],
) -> Option<String> {
    let missing: Vec<String> = wanted
        .iter()
        .filter(|id| !found.contains(id))
        .map(ToString::to_string)
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(missing.join(", "))
    }
}
