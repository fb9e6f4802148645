//! Domain models for the recipe API.
//!
//! These types represent validated domain objects separate from database
//! row types and from the JSON shapes in [`crate::routes`].

pub mod ingredient;
pub mod recipe;
pub mod session;
pub mod tag;
pub mod user;

pub use ingredient::Ingredient;
pub use recipe::{NewRecipe, Recipe};
pub use session::{CurrentUser, keys as session_keys};
pub use tag::Tag;
pub use user::{AuthToken, NewUser, User};
