//! JSON request and response shapes.
//!
//! Requests are deserialized leniently (a missing or `null` field is `None`)
//! and then validated into domain types so that every problem surfaces as a
//! 400 with a field-specific message.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use recipe_core::{IngredientId, Name, Price, RecipeId, TagId};

use crate::models::{Ingredient, NewRecipe, Recipe, Tag, User};

/// Longest accepted recipe link.
const MAX_LINK_LENGTH: usize = 255;

/// Longest accepted display name.
const MAX_DISPLAY_NAME_LENGTH: usize = 255;

/// A request payload failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field was absent.
    #[error("{0}: this field is required")]
    Required(&'static str),

    /// A field was present but invalid.
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ValidationError {
    fn invalid(field: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            field,
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl RegisterRequest {
    /// Check the optional display name and return it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is too long.
    pub fn validate(&self) -> Result<Option<&str>, ValidationError> {
        self.name.as_deref().map(validate_display_name).transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_display_name(name)?;
        }
        Ok(())
    }
}

fn validate_display_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::invalid(
            "name",
            format!("must be at most {MAX_DISPLAY_NAME_LENGTH} characters"),
        ));
    }
    Ok(name)
}

/// Public view of a user. Never includes the password.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_string(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// =============================================================================
// Tags and ingredients
// =============================================================================

/// Create payload shared by tags and ingredients.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: Option<String>,
}

impl NameRequest {
    /// Validate the name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank or too long.
    pub fn validate(&self) -> Result<Name, ValidationError> {
        Name::parse(self.name.as_deref().unwrap_or_default())
            .map_err(|e| ValidationError::invalid("name", e))
    }
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: TagId,
    pub name: Name,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: IngredientId,
    pub name: Name,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

// =============================================================================
// Recipes
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<TagId>>,
    pub ingredients: Option<Vec<IngredientId>>,
}

impl CreateRecipeRequest {
    /// Validate into a storable recipe.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(self) -> Result<NewRecipe, ValidationError> {
        let title = Name::parse(self.title.as_deref().unwrap_or_default())
            .map_err(|e| ValidationError::invalid("title", e))?;

        let time_minutes = self
            .time_minutes
            .ok_or(ValidationError::Required("time_minutes"))?;
        let time_minutes = i32::try_from(time_minutes)
            .ok()
            .filter(|m| *m >= 0)
            .ok_or_else(|| {
                ValidationError::invalid("time_minutes", "must be a non-negative integer")
            })?;

        let price = self.price.ok_or(ValidationError::Required("price"))?;
        let price = Price::new(price).map_err(|e| ValidationError::invalid("price", e))?;

        let link = self.link.as_deref().unwrap_or_default().trim().to_owned();
        if link.chars().count() > MAX_LINK_LENGTH {
            return Err(ValidationError::invalid(
                "link",
                format!("must be at most {MAX_LINK_LENGTH} characters"),
            ));
        }

        Ok(NewRecipe {
            title,
            time_minutes,
            price,
            link,
            tags: self.tags.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
        }
        .normalized())
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: RecipeId,
    pub title: Name,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientId>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
        }
    }
}
