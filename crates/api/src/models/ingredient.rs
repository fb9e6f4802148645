//! Ingredient domain type.

use std::fmt;

use recipe_core::{IngredientId, Name, UserId};

/// An ingredient in a user's pantry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub user_id: UserId,
    pub name: Name,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_display_is_name() {
        let ingredient = Ingredient {
            id: IngredientId::new(1),
            user_id: UserId::new(1),
            name: Name::parse("Cucumber").unwrap(),
        };
        assert_eq!(ingredient.to_string(), "Cucumber");
    }
}
