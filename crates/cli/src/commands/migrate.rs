//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! recipe-cli migrate
//! ```
//!
//! Runs the API's SQL migrations from `crates/api/migrations/`, then
//! creates the `tower_sessions` schema used by the session store.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running API migrations...");
    recipe_api::db::migrate(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
