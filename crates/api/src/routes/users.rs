//! Account route handlers.
//!
//! Registration, token login, logout and the caller's own profile.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::extract::JsonBody;
use crate::routes::types::{
    RegisterRequest, TokenRequest, TokenResponse, UpdateProfileRequest, UserResponse,
};
use crate::services::users::UserService;
use crate::state::AppState;

/// Register a new account.
///
/// POST /user/create/
pub async fn create(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let name = request.validate()?;
    let user = UserService::new(state.store())
        .register(
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
            name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Exchange credentials for the user's API token and log the session in.
///
/// POST /user/token/
pub async fn token(
    State(state): State<AppState>,
    session: Session,
    JsonBody(request): JsonBody<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let users = UserService::new(state.store());
    let user = users
        .authenticate(
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    let token = users.issue_token(&user).await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(user_id = %user.id, "Token issued");
    Ok(Json(TokenResponse { token: token.key }))
}

/// Clear the session.
///
/// POST /user/logout/
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's profile.
///
/// GET /user/me/
pub async fn me(RequireAuth(user): RequireAuth) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// Update the caller's display name and/or password.
///
/// PATCH /user/me/
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    request.validate()?;
    let updated = UserService::new(state.store())
        .update_profile(&user, request.name.as_deref(), request.password.as_deref())
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, header};
    use serde_json::json;

    use crate::test_support::{TestApp, json_request};

    #[tokio::test]
    async fn test_create_valid_user_success() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                Method::POST,
                "/user/create/",
                None,
                Some(json!({"email": "test@londonappdev.com", "password": "testpass", "name": "Test name"})),
            )
            .await;

        assert_eq!(status, 201);
        assert_eq!(body, json!({"email": "test@londonappdev.com", "name": "Test name"}));
        assert!(body.get("password").is_none());
        assert_eq!(app.store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_create_user_exists() {
        let app = TestApp::new();
        app.user("test@londonappdev.com").await;

        let (status, _) = app
            .call(
                Method::POST,
                "/user/create/",
                None,
                Some(json!({"email": "TEST@londonappdev.com", "password": "testpass"})),
            )
            .await;

        assert_eq!(status, 409);
        assert_eq!(app.store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_password_too_short() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                Method::POST,
                "/user/create/",
                None,
                Some(json!({"email": "test@londonappdev.com", "password": "pw"})),
            )
            .await;

        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("at least 5"));
        assert_eq!(app.store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_create_user_missing_email() {
        let app = TestApp::new();
        let (status, _) = app
            .call(
                Method::POST,
                "/user/create/",
                None,
                Some(json!({"email": "", "password": "testpass"})),
            )
            .await;

        assert_eq!(status, 400);
        assert_eq!(app.store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_create_user_null_or_malformed_fields() {
        let app = TestApp::new();

        for payload in [
            json!({"email": null, "password": "testpass"}),
            json!({"email": "test@londonappdev.com", "password": null}),
            json!({"email": 42, "password": "testpass"}),
        ] {
            let (status, body) = app
                .call(Method::POST, "/user/create/", None, Some(payload))
                .await;
            assert_eq!(status, 400);
            assert!(body["error"].is_string());
        }

        assert_eq!(app.store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_create_token_for_user() {
        let app = TestApp::new();
        app.user("test@londonappdev.com").await;

        let (status, body) = app
            .call(
                Method::POST,
                "/user/token/",
                None,
                Some(json!({"email": "test@londonappdev.com", "password": "testpass"})),
            )
            .await;

        assert_eq!(status, 200);
        let token = body["token"].as_str().unwrap();
        assert_eq!(token.len(), 40);

        let (status, body) = app.call(Method::GET, "/user/me/", Some(token), None).await;
        assert_eq!(status, 200);
        assert_eq!(body["email"], "test@londonappdev.com");
    }

    #[tokio::test]
    async fn test_create_token_invalid_credentials() {
        let app = TestApp::new();
        app.user("test@londonappdev.com").await;

        let (status, body) = app
            .call(
                Method::POST,
                "/user/token/",
                None,
                Some(json!({"email": "test@londonappdev.com", "password": "wrong"})),
            )
            .await;

        assert_eq!(status, 400);
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn test_create_token_no_user() {
        let app = TestApp::new();
        let (status, _) = app
            .call(
                Method::POST,
                "/user/token/",
                None,
                Some(json!({"email": "nobody@londonappdev.com", "password": "testpass"})),
            )
            .await;

        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_retrieve_user_unauthorized() {
        let app = TestApp::new();
        let (status, body) = app.call(Method::GET, "/user/me/", None, None).await;

        assert_eq!(status, 401);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_token_unauthorized() {
        let app = TestApp::new();
        let (status, _) = app
            .call(Method::GET, "/user/me/", Some("not-a-real-token"), None)
            .await;

        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_session_login_and_logout() {
        let app = TestApp::new();
        app.user("session@londonappdev.com").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/user/token/",
                None,
                Some(json!({"email": "session@londonappdev.com", "password": "testpass"})),
            ))
            .await;
        assert_eq!(response.status(), 200);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_owned();

        let mut request = json_request(Method::GET, "/user/me/", None, None);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.send(request).await;
        assert_eq!(response.status(), 200);

        let mut request = json_request(Method::POST, "/user/logout/", None, None);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.send(request).await;
        assert_eq!(response.status(), 204);

        let mut request = json_request(Method::GET, "/user/me/", None, None);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.send(request).await;
        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_tampered_session_cookie_rejected() {
        let app = TestApp::new();
        app.user("session@londonappdev.com").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/user/token/",
                None,
                Some(json!({"email": "session@londonappdev.com", "password": "testpass"})),
            ))
            .await;
        let mut cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_owned();
        let last = cookie.pop().unwrap();
        cookie.push(if last == 'A' { 'B' } else { 'A' });

        let mut request = json_request(Method::GET, "/user/me/", None, None);
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = app.send(request).await;
        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_update_user_profile() {
        let app = TestApp::new();
        let (_, token) = app.user("profile@londonappdev.com").await;

        let (status, body) = app
            .call(
                Method::PATCH,
                "/user/me/",
                Some(&token),
                Some(json!({"name": "new name", "password": "newpassword123"})),
            )
            .await;

        assert_eq!(status, 200);
        assert_eq!(body["name"], "new name");

        let (status, _) = app
            .call(
                Method::POST,
                "/user/token/",
                None,
                Some(json!({"email": "profile@londonappdev.com", "password": "newpassword123"})),
            )
            .await;
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_update_user_profile_requires_auth() {
        let app = TestApp::new();
        let (status, _) = app
            .call(Method::PATCH, "/user/me/", None, Some(json!({"name": "x"})))
            .await;

        assert_eq!(status, 401);
    }
}
