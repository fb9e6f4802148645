//! Recipe API library.
//!
//! Users, tags, ingredients and recipes behind an authenticated JSON API.
//! The binary in `main.rs` wires this library to `PostgreSQL` and Sentry.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
