//! ShopNow CLI - terminal storefront and catalog admin.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shopnow products list
//! shopnow products list --category tenis
//! shopnow products search camisa
//!
//! # Cart
//! shopnow cart add -- -NqL2xAbc01
//! shopnow cart set -- -NqL2xAbc01 3
//! shopnow cart show
//!
//! # Account and checkout
//! shopnow auth signup -e ana@example.com -p segredo1 --name "Ana Souza"
//! shopnow checkout --zip 50000-000 --card-number "4111 1111 1111 1111" \
//!     --card-name "ANA SOUZA" --expiry 12/30 --cvv 123
//!
//! # Admin
//! shopnow products add --name "Camisa Polo" --category camisas --price 89.90 --quantity 12
//! shopnow products stats
//! ```
//!
//! # Commands
//!
//! - `products` - Catalog browsing and admin CRUD
//! - `cart` - Cart contents
//! - `auth` - Sign-up, sign-in, profile
//! - `checkout` - Place an order for the current cart
//!
//! Configuration comes from `SHOPNOW_*` environment variables (see
//! `shopnow_storefront::config`). Logs go to stderr; set `RUST_LOG` to
//! change the level.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shopnow_storefront::config::StorefrontConfig;
use shopnow_storefront::error::AppError;
use shopnow_storefront::state::AppState;

mod commands;
mod render;

const DEFAULT_LOG_FILTER: &str = "shopnow_storefront=info,shopnow_cli=info";

#[derive(Parser)]
#[command(name = "shopnow")]
#[command(author, version, about = "ShopNow storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage the catalog
    Products {
        #[command(subcommand)]
        action: commands::products::ProductAction,
    },
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Sign up, sign in and manage the profile
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Pay for the cart and place the order
    Checkout(commands::checkout::CheckoutArgs),
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        if e.is_internal() {
            tracing::error!(error = %e, "Command failed");
        } else {
            tracing::debug!(error = %e, "Command rejected");
        }
        render::failure(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = StorefrontConfig::from_env()?;
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Products { action } => commands::products::run(&state, action).await,
        Commands::Cart { action } => commands::cart::run(&state, action).await,
        Commands::Auth { action } => commands::auth::run(&state, action).await,
        Commands::Checkout(args) => commands::checkout::run(&state, args).await,
    }
}
