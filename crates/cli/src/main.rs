//! Nordic Aroma CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! na-cli migrate
//!
//! # Expire abandoned carts older than 30 days (the janitor)
//! na-cli expire --days 30
//!
//! # Seed the catalog with demo products
//! na-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `expire` - Move over-age abandoned carts to their terminal state
//! - `seed` - Seed the products table with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "na-cli")]
#[command(author, version, about = "Nordic Aroma CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Expire abandoned carts past their maximum age
    Expire {
        /// Maximum age in days before an abandoned cart expires
        #[arg(short, long, default_value_t = 30)]
        days: i64,
    },
    /// Seed the products table with demo data
    Seed,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Expire { days } => {
            let expired = commands::expire::run(days).await?;
            tracing::info!(expired, "Expire run complete");
        }
        Commands::Seed => commands::seed::products().await?,
    }
    Ok(())
}
