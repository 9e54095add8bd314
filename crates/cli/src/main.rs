//! Rocket Cart CLI - Inspect and modify the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the current cart
//! rcart show
//!
//! # Add one unit of product 1
//! rcart add 1
//!
//! # Set product 1 to three units
//! rcart update 1 3
//!
//! # Remove product 1
//! rcart remove 1
//! ```
//!
//! # Commands
//!
//! - `show` - Print cart lines and subtotal
//! - `add` - Add one unit of a product (checked against stock)
//! - `remove` - Remove a product's line
//! - `update` - Set a product's quantity (checked against stock)
//!
//! Configuration comes from the environment; see `rocket_cart::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_cart::{CartConfig, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rcart")]
#[command(author, version, about = "Rocket Cart command-line tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity (values below 1 are ignored)
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Cart output goes to stdout, so logs go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_cart=warn,rocket_cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CartConfig) -> Result<(), commands::CommandError> {
    let store = commands::cart::open(&config)?;

    match cli.command {
        Commands::Show => commands::cart::show(&store).await,
        Commands::Add { id } => commands::cart::add(&store, id).await?,
        Commands::Remove { id } => commands::cart::remove(&store, id).await?,
        Commands::Update { id, amount } => commands::cart::update(&store, id, amount).await?,
    }
    Ok(())
}
