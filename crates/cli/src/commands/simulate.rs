//! Run a seeding simulation.
//!
//! # Environment Variables
//!
//! - `KLAVIYO_API_KEY` - Private API key with `events:write` (not needed with `--dry-run`)
//! - `KLAVIYO_BASE_URL` - API base URL (default `https://a.klaviyo.com/api`)
//! - `SEEDER_NUM_USERS`, `SEEDER_PRODUCT_FEED`, `SEEDER_RNG_SEED` - overridable by flags
//! - `SEEDER_LOOKBACK_DAYS`, `SEEDER_SHIPPING_COUNTRIES` - event window and destinations

use std::path::PathBuf;

use journey_seeder::config::SeederConfig;
use journey_seeder::{
    DryRunSink, EventSink, KlaviyoClient, SimulationConfig, SimulationReport, Simulator,
    load_catalog,
};
use journey_seeder_core::Product;
use tracing::info;

/// Command-line values that take precedence over the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub users: Option<u32>,
    pub feed: Option<PathBuf>,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

impl Overrides {
    fn apply(self, config: &mut SimulationConfig) {
        if let Some(users) = self.users {
            config.num_users = users;
        }
        if let Some(feed) = self.feed {
            config.feed_path = feed;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Load config and catalog, then simulate against Klaviyo or a dry-run sink.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the API key is missing on a
/// live run, the feed cannot be loaded, or the catalog is empty.
pub async fn run(overrides: Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = overrides.dry_run;
    let mut config = SeederConfig::from_env()?;
    overrides.apply(&mut config.simulation);
    let simulation = &config.simulation;

    let catalog = load_catalog(&simulation.feed_path).await?;
    info!(
        path = %simulation.feed_path.display(),
        products = catalog.len(),
        "Loaded product feed"
    );

    let report = if dry_run {
        info!("Dry run, no events will be sent");
        simulate(simulation, &catalog, &DryRunSink).await?
    } else {
        let client = KlaviyoClient::new(config.require_klaviyo()?)?;
        info!(endpoint = %client.events_url(), "Sending events to Klaviyo");
        simulate(simulation, &catalog, &client).await?
    };

    log_report(&report);
    Ok(())
}

async fn simulate<S: EventSink>(
    config: &SimulationConfig,
    catalog: &[Product],
    sink: &S,
) -> Result<SimulationReport, journey_seeder::Error> {
    Ok(Simulator::new(config, catalog, sink).run().await?)
}

fn log_report(report: &SimulationReport) {
    for (metric, count) in &report.events {
        info!(metric = %metric, count, "Events by metric");
    }
    info!(
        users = report.users,
        sessions = report.sessions,
        orders = report.orders_placed,
        attempted = report.events_attempted(),
        accepted = report.accepted,
        rejected = report.rejected,
        failed = report.failed,
        skipped = report.skipped,
        "Seeding finished"
    );
}
