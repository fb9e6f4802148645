//! Authentication extractors.
//!
//! A request is authenticated by an `Authorization: Bearer <key>` (or
//! `Token <key>`) header, or by a logged-in session.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, User, session_keys};
use crate::services::users::UserService;
use crate::state::AppState;

const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Invalid token.";

/// Extractor that requires an authenticated, active user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let users = UserService::new(state.store());

        // A presented token is authoritative: a bad one is not retried
        // against the session.
        if let Some(key) = token_from_headers(&parts.headers)? {
            let user = users
                .user_for_token(key)
                .await?
                .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_owned()))?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            return Ok(Self(user));
        }

        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_owned()))?;

        let current: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_owned()))?;

        let user = state
            .store()
            .get_user(current.id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_owned()))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// Pull the token key out of the `Authorization` header.
///
/// Returns `Ok(None)` when no header is present and an error when the
/// header uses an unknown scheme or is malformed.
fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.to_owned()))?;

    let (scheme, key) = value
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_owned()))?;

    let key = key.trim();
    if !(scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token"))
        || key.is_empty()
    {
        return Err(AppError::Unauthorized(INVALID_TOKEN.to_owned()));
    }

    Ok(Some(key))
}

/// Store the user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
