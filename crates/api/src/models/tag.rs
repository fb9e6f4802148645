//! Tag domain type.

use std::fmt;

use recipe_core::{Name, TagId, UserId};

/// A label a user attaches to their recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: Name,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}
