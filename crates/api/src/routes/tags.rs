//! Tag route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::extract::JsonBody;
use crate::routes::types::{NameRequest, TagResponse};
use crate::state::AppState;

/// The caller's tags, by name descending.
///
/// GET /recipe/tags/
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<TagResponse>>> {
    let tags = state.store().list_tags(user.id).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Create a tag owned by the caller.
///
/// POST /recipe/tags/
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<NameRequest>,
) -> Result<impl IntoResponse> {
    let name = request.validate()?;
    let tag = state.store().create_tag(user.id, &name).await?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}
