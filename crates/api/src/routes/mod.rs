//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                 - Liveness
//! GET   /health/ready           - Readiness (store reachable)
//!
//! # Users
//! POST  /user/create/           - Register
//! POST  /user/token/            - Obtain API token (also logs the session in)
//! POST  /user/logout/           - Clear the session
//! GET   /user/me/               - Own profile
//! PATCH /user/me/               - Update own profile
//!
//! # Recipes (requires auth)
//! GET   /recipe/tags/           - List tags
//! POST  /recipe/tags/           - Create tag
//! GET   /recipe/ingredients/    - List ingredients
//! POST  /recipe/ingredients/    - Create ingredient
//! GET   /recipe/recipes/        - List recipes
//! POST  /recipe/recipes/        - Create recipe
//! GET   /recipe/recipes/{id}/   - Recipe detail
//! ```

pub mod extract;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod types;
pub mod users;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore, service::SignedCookie};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create/", post(users::create))
        .route("/token/", post(users::token))
        .route("/logout/", post(users::logout))
        .route("/me/", get(users::me).patch(users::update_me))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/tags/", get(tags::index).post(tags::create))
        .route(
            "/ingredients/",
            get(ingredients::index).post(ingredients::create),
        )
        .route("/recipes/", get(recipes::index).post(recipes::create))
        .route("/recipes/{id}/", get(recipes::show))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/user", user_routes())
        .nest("/recipe", recipe_routes())
}

/// Build the full application: routes, sessions, request IDs and tracing.
///
/// Sentry layers are added by the binary.
pub fn app<S>(
    state: AppState,
    session_layer: SessionManagerLayer<S, SignedCookie>,
) -> Router
where
    S: SessionStore + Clone,
{
    routes()
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
