//! Journey seeder CLI.
//!
//! # Usage
//!
//! ```bash
//! # Seed 25 users into the account behind KLAVIYO_API_KEY
//! journey-seeder simulate --users 25
//!
//! # Print every payload instead of sending it
//! journey-seeder simulate --dry-run --seed 7
//!
//! # Check a product feed before seeding from it
//! journey-seeder catalog --feed data/product_feed.xml
//! ```
//!
//! # Commands
//!
//! - `simulate` - Generate users and send their journeys to Klaviyo
//! - `catalog` - Parse a product feed and summarize it
//!
//! Settings not given as flags come from the environment (or `.env`); see
//! `journey_seeder::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "journey-seeder")]
#[command(author, version, about = "Seed Klaviyo with synthetic customer journeys")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate users and send their events
    Simulate(SimulateArgs),
    /// Parse the product feed and summarize it
    Catalog {
        /// Product feed path (overrides `SEEDER_PRODUCT_FEED`)
        #[arg(short, long)]
        feed: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SimulateArgs {
    /// Number of users to simulate (overrides `SEEDER_NUM_USERS`)
    #[arg(short, long)]
    users: Option<u32>,

    /// Product feed path (overrides `SEEDER_PRODUCT_FEED`)
    #[arg(short, long)]
    feed: Option<PathBuf>,

    /// RNG seed for a reproducible run (overrides `SEEDER_RNG_SEED`)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log payloads instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "journey_seeder=info,journey_seeder_cli=info".into());

    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Simulate(args) => {
            let overrides = commands::simulate::Overrides {
                users: args.users,
                feed: args.feed,
                seed: args.seed,
                dry_run: args.dry_run,
            };
            commands::simulate::run(overrides).await?;
        }
        Commands::Catalog { feed } => commands::catalog::summarize(feed).await?,
    }
    Ok(())
}
