//! In-memory [`Store`] for handler and service tests.
//!
//! Mirrors the `PostgreSQL` constraints the API relies on: unique emails,
//! one token per user, owner-scoped queries and all-or-nothing recipe
//! creation.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use recipe_core::{Email, IngredientId, Name, RecipeId, TagId, UserId};

use super::{
    IngredientRepository, RecipeRepository, RepositoryError, Store, TagRepository,
    UserRepository, missing_ids,
};
use crate::models::{AuthToken, Ingredient, NewRecipe, NewUser, Recipe, Tag, User};

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: Vec<User>,
    tokens: Vec<AuthToken>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store backed by vectors behind a lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.read().users.len()
    }

    /// Number of stored tags across all users.
    pub fn tag_count(&self) -> usize {
        self.read().tags.len()
    }

    /// Number of stored recipes across all users.
    pub fn recipe_count(&self) -> usize {
        self.read().recipes.len()
    }

    /// Number of stored ingredients across all users.
    pub fn ingredient_count(&self) -> usize {
        self.read().ingredients.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.write();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.next_id()),
            email: user.email.clone(),
            name: user.name.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.read().users.iter().find(|u| &u.email == email).cloned())
    }

    async fn update_user(
        &self,
        id: UserId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.write();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(name) = name {
            name.clone_into(&mut user.name);
        }
        if let Some(hash) = password_hash {
            hash.clone_into(&mut user.password_hash);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn get_token(&self, user_id: UserId) -> Result<Option<AuthToken>, RepositoryError> {
        Ok(self
            .read()
            .tokens
            .iter()
            .find(|t| t.user_id == user_id)
            .cloned())
    }

    async fn create_token(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<AuthToken, RepositoryError> {
        let mut tables = self.write();
        if tables
            .tokens
            .iter()
            .any(|t| t.user_id == user_id || t.key == key)
        {
            return Err(RepositoryError::Conflict("token already exists".to_owned()));
        }

        let token = AuthToken {
            key: key.to_owned(),
            user_id,
            created_at: Utc::now(),
        };
        tables.tokens.push(token.clone());
        Ok(token)
    }

    async fn get_user_by_token(&self, key: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.read();
        let Some(token) = tables.tokens.iter().find(|t| t.key == key) else {
            return Ok(None);
        };
        Ok(tables.users.iter().find(|u| u.id == token.user_id).cloned())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list_tags(&self, owner: UserId) -> Result<Vec<Tag>, RepositoryError> {
        let mut tags: Vec<Tag> = self
            .read()
            .tags
            .iter()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        tags.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(tags)
    }

    async fn create_tag(&self, owner: UserId, name: &Name) -> Result<Tag, RepositoryError> {
        let mut tables = self.write();
        let tag = Tag {
            id: TagId::new(tables.next_id()),
            user_id: owner,
            name: name.clone(),
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl IngredientRepository for MemoryStore {
    async fn list_ingredients(&self, owner: UserId) -> Result<Vec<Ingredient>, RepositoryError> {
        let mut ingredients: Vec<Ingredient> = self
            .read()
            .ingredients
            .iter()
            .filter(|i| i.user_id == owner)
            .cloned()
            .collect();
        ingredients.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(ingredients)
    }

    async fn create_ingredient(
        &self,
        owner: UserId,
        name: &Name,
    ) -> Result<Ingredient, RepositoryError> {
        let mut tables = self.write();
        let ingredient = Ingredient {
            id: IngredientId::new(tables.next_id()),
            user_id: owner,
            name: name.clone(),
        };
        tables.ingredients.push(ingredient.clone());
        Ok(ingredient)
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn list_recipes(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError> {
        let mut recipes: Vec<Recipe> = self
            .read()
            .recipes
            .iter()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        recipes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(recipes)
    }

    async fn get_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RepositoryError> {
        Ok(self
            .read()
            .recipes
            .iter()
            .find(|r| r.user_id == owner && r.id == id)
            .cloned())
    }

    async fn create_recipe(
        &self,
        owner: UserId,
        recipe: &NewRecipe,
    ) -> Result<Recipe, RepositoryError> {
        let recipe = recipe.clone().normalized();
        let mut tables = self.write();

        let owned_tags: Vec<TagId> = tables
            .tags
            .iter()
            .filter(|t| t.user_id == owner)
            .map(|t| t.id)
            .collect();
        if let Some(missing) = missing_ids(&recipe.tags, &owned_tags) {
            return Err(RepositoryError::InvalidReference(format!(
                "unknown tag ids: {missing}"
            )));
        }

        let owned_ingredients: Vec<IngredientId> = tables
            .ingredients
            .iter()
            .filter(|i| i.user_id == owner)
            .map(|i| i.id)
            .collect();
        if let Some(missing) = missing_ids(&recipe.ingredients, &owned_ingredients) {
            return Err(RepositoryError::InvalidReference(format!(
                "unknown ingredient ids: {missing}"
            )));
        }

        let created = Recipe {
            id: RecipeId::new(tables.next_id()),
            user_id: owner,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
        };
        tables.recipes.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
