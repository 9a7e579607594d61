//! Bazaar CLI - browse the catalog, manage a cart and an account.
//!
//! State (session, cart, registered users, edited catalog) lives in one JSON
//! file, `.bazaar/state.json` by default, so each command picks up where the
//! last one left off.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! bazaar catalog list --category electronics
//! bazaar catalog show 1
//!
//! # Cart
//! bazaar cart add 1 --quantity 2
//! bazaar cart show
//!
//! # Sign up and confirm the phone number
//! bazaar auth register -e asha@example.com -p secret1 -n "Asha" --phone 9876500000
//! bazaar auth verify 123456
//!
//! # Manage products as the operator
//! bazaar auth login -e admin@ecommerce.com -p password123
//! bazaar admin add-product --name "Cricket Bat" --price 2999 --category Sports
//! ```
//!
//! # Commands
//!
//! - `catalog` - List and show products
//! - `cart` - Add, change, remove and show cart lines
//! - `auth` - Login, register, verify, resend, logout, whoami
//! - `profile` - Update the signed-in account
//! - `admin` - Add, update and delete products (operator only)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_store::{AppState, StoreConfig};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront CLI")]
struct Cli {
    /// State file to use instead of `BAZAAR_DATA_FILE`
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Sign in, sign up and sign out
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Edit the signed-in account
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Edit the product catalog (operator only)
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; logs go to stderr, output to stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_store=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StoreConfig::from_env()?;
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }
    let state = AppState::open(config);

    match cli.command {
        Commands::Catalog { action } => commands::catalog::run(&state, action)?,
        Commands::Cart { action } => commands::cart::run(&state, action)?,
        Commands::Auth { action } => commands::auth::run(&state, action).await?,
        Commands::Profile { action } => commands::profile::run(&state, action).await?,
        Commands::Admin { action } => commands::admin::run(&state, action)?,
    }
    Ok(())
}
