//! Ingredient route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::extract::JsonBody;
use crate::routes::types::{IngredientResponse, NameRequest};
use crate::state::AppState;

/// GET /recipe/ingredients/
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<IngredientResponse>>> {
    let ingredients = state.store().list_ingredients(user.id).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

/// POST /recipe/ingredients/
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<NameRequest>,
) -> Result<impl IntoResponse> {
    let name = request.validate()?;
    let ingredient = state.store().create_ingredient(user.id, &name).await?;

    tracing::debug!(ingredient_id = %ingredient.id, user_id = %user.id, "Ingredient created");
    Ok((StatusCode::CREATED, Json(IngredientResponse::from(ingredient))))
}
