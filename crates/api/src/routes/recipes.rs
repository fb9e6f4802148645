//! Recipe route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use recipe_core::RecipeId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::routes::extract::{JsonBody, PathParam};
use crate::routes::types::{CreateRecipeRequest, RecipeResponse};
use crate::state::AppState;

/// The caller's recipes, newest first.
///
/// GET /recipe/recipes/
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<RecipeResponse>>> {
    let recipes = state.store().list_recipes(user.id).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

/// One of the caller's recipes. Other users' recipes are reported as missing.
///
/// GET /recipe/recipes/{id}/
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<RecipeId>,
) -> Result<Json<RecipeResponse>> {
    let recipe = state
        .store()
        .get_recipe(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("recipe {id}")))?;

    Ok(Json(RecipeResponse::from(recipe)))
}

/// Create a recipe owned by the caller.
///
/// POST /recipe/recipes/
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<CreateRecipeRequest>,
) -> Result<impl IntoResponse> {
    let recipe = request.validate()?;
    let recipe = state.store().create_recipe(user.id, &recipe).await?;

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}
