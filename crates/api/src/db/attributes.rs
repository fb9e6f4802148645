//! Tag and ingredient repositories for `PostgreSQL`.
//!
//! Both tables share one shape (`id`, `user_id`, `name`), so the queries are
//! written once and parameterized by table.

use async_trait::async_trait;
use sqlx::PgPool;

use recipe_core::{IngredientId, Name, TagId, UserId};

use super::{IngredientRepository, PgStore, RepositoryError, TagRepository};
use crate::models::{Ingredient, Tag};

/// Tables holding user-owned named records.
#[derive(Debug, Clone, Copy)]
enum AttributeTable {
    Tag,
    Ingredient,
}

impl AttributeTable {
    const fn name(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }
}

#[derive(sqlx::FromRow)]
struct AttributeRow {
    id: i32,
    user_id: i32,
    name: String,
}

impl AttributeRow {
    fn parts(self) -> Result<(i32, UserId, Name), RepositoryError> {
        let name = Name::parse(&self.name)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid name in database: {e}")))?;
        Ok((self.id, UserId::new(self.user_id), name))
    }
}

/// Names compare byte-wise (`COLLATE "C"`), independent of the database locale.
fn list_sql(table: AttributeTable) -> String {
    format!(
        "SELECT id, user_id, name FROM {} WHERE user_id = $1 \
         ORDER BY name COLLATE \"C\" DESC, id DESC",
        table.name()
    )
}

async fn list(
    pool: &PgPool,
    table: AttributeTable,
    owner: UserId,
) -> Result<Vec<AttributeRow>, RepositoryError> {
    Ok(sqlx::query_as(&list_sql(table))
        .bind(owner)
        .fetch_all(pool)
        .await?)
}

async fn create(
    pool: &PgPool,
    table: AttributeTable,
    owner: UserId,
    name: &Name,
) -> Result<AttributeRow, RepositoryError> {
    let sql = format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
        table.name()
    );
    Ok(sqlx::query_as(&sql)
        .bind(owner)
        .bind(name)
        .fetch_one(pool)
        .await?)
}

fn into_tag(row: AttributeRow) -> Result<Tag, RepositoryError> {
    let (id, user_id, name) = row.parts()?;
    Ok(Tag {
        id: TagId::new(id),
        user_id,
        name,
    })
}

fn into_ingredient(row: AttributeRow) -> Result<Ingredient, RepositoryError> {
    let (id, user_id, name) = row.parts()?;
    Ok(Ingredient {
        id: IngredientId::new(id),
        user_id,
        name,
    })
}

#[async_trait]
impl TagRepository for PgStore {
    async fn list_tags(&self, owner: UserId) -> Result<Vec<Tag>, RepositoryError> {
        list(self.pool(), AttributeTable::Tag, owner)
            .await?
            .into_iter()
            .map(into_tag)
            .collect()
    }

    async fn create_tag(&self, owner: UserId, name: &Name) -> Result<Tag, RepositoryError> {
        into_tag(create(self.pool(), AttributeTable::Tag, owner, name).await?)
    }
}

#[async_trait]
impl IngredientRepository for PgStore {
    async fn list_ingredients(&self, owner: UserId) -> Result<Vec<Ingredient>, RepositoryError> {
        list(self.pool(), AttributeTable::Ingredient, owner)
            .await?
            .into_iter()
            .map(into_ingredient)
            .collect()
    }

    async fn create_ingredient(
        &self,
        owner: UserId,
        name: &Name,
    ) -> Result<Ingredient, RepositoryError> {
        into_ingredient(create(self.pool(), AttributeTable::Ingredient, owner, name).await?)
    }
}
