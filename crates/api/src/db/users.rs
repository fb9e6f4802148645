//! User and token repository for `PostgreSQL`.
//!
//! Queries use sqlx's runtime API with `FromRow` row types; rows are
//! converted into domain types after validation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use recipe_core::{Email, UserId};

use super::{PgStore, RepositoryError, UserRepository, conflict_on_unique};
use crate::models::{AuthToken, NewUser, User};

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, is_staff, is_superuser, \
                            created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    key: String,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<TokenRow> for AuthToken {
    fn from(row: TokenRow) -> Self {
        Self {
            key: row.key,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO app_user (email, name, password_hash, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .fetch_one(self.pool())
            .await
            .map_err(|e| conflict_on_unique(e, "email already exists"))?;

        row.try_into()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn update_user(
        &self,
        id: UserId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE app_user \
             SET name = COALESCE($2, name), \
                 password_hash = COALESCE($3, password_hash), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(name)
            .bind(password_hash)
            .fetch_optional(self.pool())
            .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn get_token(&self, user_id: UserId) -> Result<Option<AuthToken>, RepositoryError> {
        let row: Option<TokenRow> =
            sqlx::query_as("SELECT key, user_id, created_at FROM auth_token WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;

        Ok(row.map(AuthToken::from))
    }

    async fn create_token(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<AuthToken, RepositoryError> {
        let row: TokenRow = sqlx::query_as(
            "INSERT INTO auth_token (key, user_id) VALUES ($1, $2) \
             RETURNING key, user_id, created_at",
        )
        .bind(key)
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "token already exists"))?;

        Ok(row.into())
    }

    async fn get_user_by_token(&self, key: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM app_user \
             WHERE id = (SELECT user_id FROM auth_token WHERE key = $1)"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        row.map(User::try_from).transpose()
    }
}
