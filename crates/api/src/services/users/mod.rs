//! Account service.
//!
//! Creates users and superusers, checks passwords and issues API tokens.

mod error;

pub use error::UserError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

use recipe_core::Email;

use crate::db::{RepositoryError, Store};
use crate::models::{AuthToken, NewUser, User};

/// Minimum password length for self-service registration and updates.
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Random bytes per token (hex encoded to 40 characters).
const TOKEN_BYTES: usize = 20;

/// Account service.
pub struct UserService<'a> {
    store: &'a dyn Store,
}

impl<'a> UserService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a regular user.
    ///
    /// The email is trimmed and lowercased before storage. The password is
    /// hashed as given; length rules apply only to [`UserService::register`].
    ///
    /// # Errors
    ///
    /// Returns `UserError::MissingEmail` if the email is blank,
    /// `UserError::InvalidEmail` if it is malformed and
    /// `UserError::AlreadyExists` if it is taken.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<User, UserError> {
        self.insert(email, password, String::new(), false).await
    }

    /// Create a user with `is_staff` and `is_superuser` set.
    ///
    /// # Errors
    ///
    /// Same as [`UserService::create_user`].
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, UserError> {
        self.insert(email, password, String::new(), true).await
    }

    /// Self-service registration.
    ///
    /// # Errors
    ///
    /// As [`UserService::create_user`], plus `UserError::WeakPassword` if
    /// the password is shorter than [`MIN_PASSWORD_LENGTH`].
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, UserError> {
        // Check the email first so a blank email reports as such
        normalize_email(email)?;
        validate_password(password)?;

        let name = name.map(str::trim).unwrap_or_default().to_owned();
        self.insert(email, password, name, false).await
    }

    async fn insert(
        &self,
        email: &str,
        password: &str,
        name: String,
        superuser: bool,
    ) -> Result<User, UserError> {
        let email = normalize_email(email)?;
        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(&NewUser {
                email,
                name,
                password_hash,
                is_staff: superuser,
                is_superuser: superuser,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => UserError::AlreadyExists,
                other => UserError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, superuser, "User created");
        Ok(user)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidCredentials` if the email is unknown, the
    /// password is wrong or the account is inactive.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let email = Email::normalize(email).map_err(|_| UserError::InvalidCredentials)?;

        let user = self
            .store
            .get_user_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active || !check_password(&user, password) {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Return the user's API token, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the token cannot be read or stored.
    pub async fn issue_token(&self, user: &User) -> Result<AuthToken, UserError> {
        if let Some(token) = self.store.get_token(user.id).await? {
            return Ok(token);
        }

        match self.store.create_token(user.id, &generate_token_key()).await {
            Ok(token) => Ok(token),
            // Lost a race with a concurrent request for the same user
            Err(RepositoryError::Conflict(_)) => self
                .store
                .get_token(user.id)
                .await?
                .ok_or(UserError::Repository(RepositoryError::NotFound)),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a token to an active user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the lookup fails.
    pub async fn user_for_token(&self, key: &str) -> Result<Option<User>, UserError> {
        let user = self.store.get_user_by_token(key).await?;
        Ok(user.filter(|u| u.is_active))
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update the display name and/or password.
    ///
    /// # Errors
    ///
    /// Returns `UserError::WeakPassword` if the new password is too short.
    pub async fn update_profile(
        &self,
        user: &User,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, UserError> {
        let password_hash = match password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let updated = self
            .store
            .update_user(user.id, name.map(str::trim), password_hash.as_deref())
            .await?;
        Ok(updated)
    }
}

/// Check a plaintext password against the user's stored hash.
#[must_use]
pub fn check_password(user: &User, password: &str) -> bool {
    verify_password(password, &user.password_hash).is_ok()
}

/// Validate and normalize an email, treating blank input as missing.
fn normalize_email(email: &str) -> Result<Email, UserError> {
    if email.trim().is_empty() {
        return Err(UserError::MissingEmail);
    }
    Ok(Email::normalize(email)?)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| UserError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), UserError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| UserError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| UserError::InvalidCredentials)
}

/// 40 lowercase hex characters of OS randomness.
fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}
