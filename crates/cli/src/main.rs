//! Sandbar CLI - Demo surface for the storefront client.
//!
//! # Usage
//!
//! ```bash
//! # List the product catalog
//! sandbar catalog
//!
//! # Include inventory counts (v2 only honors the query)
//! sandbar --api-version v2 catalog --inventory
//!
//! # Build a cart and check out
//! sandbar checkout -e shopper@example.com -i 1:2 -i 2:1 --coupon SAVE10
//!
//! # Drive a backend test scenario
//! sandbar --scenario coupon-expired checkout -e shopper@example.com -i 1:1
//! ```
//!
//! # Commands
//!
//! - `catalog` - Fetch and print the product catalog
//! - `checkout` - Build a cart from `ID:QTY` items and submit a checkout
//!
//! Global `--base-url`, `--api-version`, and `--scenario` flags override
//! the environment configuration for the invocation (the developer
//! settings surface).

#![cfg_attr(not(test), forbid(unsafe_code))]
// Stdout is this binary's user interface.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use sandbar_client::{ApiClient, ApiVersion, Settings};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sandbar")]
#[command(author, version, about = "Sandbar storefront demo CLI")]
struct Cli {
    /// Override the configured API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override the configured API version (v1 or v2)
    #[arg(long, global = true)]
    api_version: Option<ApiVersion>,

    /// Send this X-Scenario tag with every request
    #[arg(long, global = true)]
    scenario: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the product catalog
    Catalog {
        /// Also request inventory counts
        #[arg(long)]
        inventory: bool,
    },
    /// Build a cart and submit a checkout
    Checkout(commands::checkout::CheckoutArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 1.0,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let settings = Settings::from_env().expect("Failed to load configuration");
    let config = settings.snapshot();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(config.sentry_dsn.as_deref());

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sandbar=info,sandbar_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    // Apply command-line overrides through the developer settings surface
    if let Some(url) = &cli.base_url {
        settings.set_base_url(url).expect("Invalid --base-url");
    }
    if let Some(version) = cli.api_version {
        settings.set_api_version(version);
    }
    if cli.scenario.is_some() {
        settings.set_scenario(cli.scenario.clone());
    }

    let client = ApiClient::new(settings);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli.command, &client).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Catalog { inventory } => commands::catalog::run(client, inventory).await?,
        Commands::Checkout(args) => commands::checkout::run(client, args).await?,
    }
    Ok(())
}
