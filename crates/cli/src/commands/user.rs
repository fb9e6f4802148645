//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a superuser (staff + superuser flags)
//! recipe-cli user create-superuser -e admin@example.com -p 'secret'
//!
//! # Create a regular user
//! recipe-cli user create -e cook@example.com -p 'secret'
//! ```

use recipe_api::db::PgStore;
use recipe_api::models::User;
use recipe_api::services::UserService;

use super::{CommandError, connect};

/// Create an account and return it.
///
/// # Errors
///
/// Returns an error if the email is missing, invalid or taken, or if the
/// database is unreachable.
pub async fn create(email: &str, password: &str, superuser: bool) -> Result<User, CommandError> {
    let store = PgStore::new(connect().await?);
    let users = UserService::new(&store);

    let user = if superuser {
        users.create_superuser(email, password).await?
    } else {
        users.create_user(email, password).await?
    };

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Superuser: {}",
        user.id,
        user.email,
        user.is_superuser
    );
    Ok(user)
}
