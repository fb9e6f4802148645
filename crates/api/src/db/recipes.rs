//! Recipe repository for `PostgreSQL`.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use recipe_core::{IngredientId, Name, Price, RecipeId, TagId, UserId};

use super::{PgStore, RecipeRepository, RepositoryError, missing_ids};
use crate::models::{NewRecipe, Recipe};

const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, link";

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i32,
    user_id: i32,
    title: String,
    time_minutes: i32,
    price: Decimal,
    link: String,
}

impl RecipeRow {
    fn into_recipe(
        self,
        tags: Vec<TagId>,
        ingredients: Vec<IngredientId>,
    ) -> Result<Recipe, RepositoryError> {
        let title = Name::parse(&self.title).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid recipe title in database: {e}"))
        })?;
        let price = Price::new(self.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid recipe price in database: {e}"))
        })?;

        Ok(Recipe {
            id: RecipeId::new(self.id),
            user_id: UserId::new(self.user_id),
            title,
            time_minutes: self.time_minutes,
            price,
            link: self.link,
            tags,
            ingredients,
        })
    }
}

/// Load tag and ingredient links for a batch of recipe rows.
async fn with_links(pool: &PgPool, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, RepositoryError> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

    let tag_links: Vec<(i32, i32)> = sqlx::query_as(
        "SELECT recipe_id, tag_id FROM recipe_tag WHERE recipe_id = ANY($1) ORDER BY tag_id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let ingredient_links: Vec<(i32, i32)> = sqlx::query_as(
        "SELECT recipe_id, ingredient_id FROM recipe_ingredient \
         WHERE recipe_id = ANY($1) ORDER BY ingredient_id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut tags: HashMap<i32, Vec<TagId>> = HashMap::new();
    for (recipe_id, tag_id) in tag_links {
        tags.entry(recipe_id).or_default().push(TagId::new(tag_id));
    }
    let mut ingredients: HashMap<i32, Vec<IngredientId>> = HashMap::new();
    for (recipe_id, ingredient_id) in ingredient_links {
        ingredients
            .entry(recipe_id)
            .or_default()
            .push(IngredientId::new(ingredient_id));
    }

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            row.into_recipe(
                tags.remove(&id).unwrap_or_default(),
                ingredients.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}

#[async_trait]
impl RecipeRepository for PgStore {
    async fn list_recipes(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipe WHERE user_id = $1 ORDER BY id DESC");
        let rows: Vec<RecipeRow> = sqlx::query_as(&sql)
            .bind(owner)
            .fetch_all(self.pool())
            .await?;

        with_links(self.pool(), rows).await
    }

    async fn get_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipe WHERE user_id = $1 AND id = $2");
        let row: Option<RecipeRow> = sqlx::query_as(&sql)
            .bind(owner)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(with_links(self.pool(), vec![row]).await?.pop())
    }

    async fn create_recipe(
        &self,
        owner: UserId,
        recipe: &NewRecipe,
    ) -> Result<Recipe, RepositoryError> {
        let recipe = recipe.clone().normalized();
        let mut tx = self.pool().begin().await?;

        let owned_tags: Vec<TagId> =
            sqlx::query_scalar("SELECT id FROM tag WHERE user_id = $1 AND id = ANY($2)")
                .bind(owner)
                .bind(&recipe.tags)
                .fetch_all(&mut *tx)
                .await?;
        if let Some(missing) = missing_ids(&recipe.tags, &owned_tags) {
            return Err(RepositoryError::InvalidReference(format!(
                "unknown tag ids: {missing}"
            )));
        }

        let owned_ingredients: Vec<IngredientId> =
            sqlx::query_scalar("SELECT id FROM ingredient WHERE user_id = $1 AND id = ANY($2)")
                .bind(owner)
                .bind(&recipe.ingredients)
                .fetch_all(&mut *tx)
                .await?;
        if let Some(missing) = missing_ids(&recipe.ingredients, &owned_ingredients) {
            return Err(RepositoryError::InvalidReference(format!(
                "unknown ingredient ids: {missing}"
            )));
        }

        let sql = format!(
            "INSERT INTO recipe (user_id, title, time_minutes, price, link) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {RECIPE_COLUMNS}"
        );
        let row: RecipeRow = sqlx::query_as(&sql)
            .bind(owner)
            .bind(&recipe.title)
            .bind(recipe.time_minutes)
            .bind(recipe.price)
            .bind(&recipe.link)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO recipe_tag (recipe_id, tag_id) SELECT $1, unnest($2::int[])")
            .bind(row.id)
            .bind(&recipe.tags)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO recipe_ingredient (recipe_id, ingredient_id) SELECT $1, unnest($2::int[])",
        )
        .bind(row.id)
        .bind(&recipe.ingredients)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(recipe_id = row.id, user_id = %owner, "Recipe created");
        row.into_recipe(recipe.tags, recipe.ingredients)
    }
}
