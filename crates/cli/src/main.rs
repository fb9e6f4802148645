//! Recipe API CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! recipe-cli migrate
//!
//! # Create a superuser
//! recipe-cli user create-superuser -e admin@example.com -p 'secret'
//!
//! # Create a regular user
//! recipe-cli user create -e cook@example.com -p 'secret'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "recipe-cli")]
#[command(author, version, about = "Recipe API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a regular user
    Create {
        /// Email address (normalized to lowercase)
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Create a superuser
    CreateSuperuser {
        /// Email address (normalized to lowercase)
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, password } => {
                commands::user::create(&email, &password, false).await?;
            }
            UserAction::CreateSuperuser { email, password } => {
                commands::user::create(&email, &password, true).await?;
            }
        },
    }
    Ok(())
}
