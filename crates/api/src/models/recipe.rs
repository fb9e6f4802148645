//! Recipe domain types.

use std::fmt;

use recipe_core::{IngredientId, Name, Price, RecipeId, TagId, UserId};

/// A recipe owned by a user.
///
/// `tags` and `ingredients` are sorted ascending by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: Name,
    pub time_minutes: i32,
    pub price: Price,
    /// External URL; empty when unset.
    pub link: String,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientId>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.title, f)
    }
}

/// A validated recipe waiting to be stored.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: Name,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientId>,
}

impl NewRecipe {
    /// Sort and deduplicate the linked ids.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.tags.sort_unstable();
        self.tags.dedup();
        self.ingredients.sort_unstable();
        self.ingredients.dedup();
        self
    }
}
