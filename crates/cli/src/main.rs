//! Mercadillo Global CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! mg-cli migrate
//!
//! # Insert demo products into a category
//! mg-cli seed demo --category MLG-COCINA --count 30
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed demo` - Seed the catalog with demo listings

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mg-cli")]
#[command(author, version, about = "Mercadillo Global CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert demo products, reviews, and questions into a category
    Demo {
        /// Category id from the category document
        #[arg(short, long)]
        category: String,

        /// Number of products to create
        #[arg(short = 'n', long, default_value_t = 24)]
        count: u32,

        /// Category document used to validate the category id
        #[arg(long, default_value = "categories.json")]
        categories: PathBuf,
    },
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
        Commands::Seed { target } => match target {
            SeedTarget::Demo {
                category,
                count,
                categories,
            } => {
                commands::seed::demo(&category, count, &categories).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["mg-cli", "seed", "demo", "--category", "MLG-COCINA"]);
        let Ok(Cli {
            command: Commands::Seed {
                target: SeedTarget::Demo { category, count, categories },
            },
        }) = cli
        else {
            panic!("seed demo should parse");
        };
        assert_eq!(category, "MLG-COCINA");
        assert_eq!(count, 24);
        assert_eq!(categories, PathBuf::from("categories.json"));
    }
}
