//! Recipe Core - Shared domain types.
//!
//! This crate provides the validated types used by the recipe components:
//! - `api` - The HTTP service (users, tags, ingredients, recipes)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, names and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
