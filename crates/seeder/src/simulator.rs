//! Session simulation.
//!
//! Each simulated user gets one profile and 1-5 shopping sessions. A
//! session is a fixed burst of events two seconds apart:
//!
//! 1. Active on Site
//! 2. Viewed Product (quantity 1)
//! 3. Added to Cart
//! 4. Started Checkout (random completion flag and shipping country)
//! 5. Placed Order, only if the checkout completed (shipping country drawn
//!    again, independently)
//!
//! Delivery outcomes are counted but never change the sequence.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{DateTime, TimeDelta, Utc};
use journey_seeder_core::{Event, Metric, Product, Profile};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock, TimestampWindow};
use crate::config::SimulationConfig;
use crate::profile::generate_profile;
use crate::sink::{Delivery, EventSink};

/// Sessions simulated per user.
pub const SESSIONS_PER_USER: RangeInclusive<u32> = 1..=5;
/// Units added to the cart per session.
pub const QUANTITY_RANGE: RangeInclusive<u32> = 1..=4;
/// Gap between consecutive events of a session.
pub const EVENT_SPACING_SECS: i64 = 2;

/// Errors that abort a simulation before any event is sent.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Product catalog is empty, nothing to simulate for {0} users")]
    EmptyCatalog(u32),
}

/// The events of one shopping session, in emission order.
#[derive(Debug, Clone)]
pub struct SessionPlan<'a> {
    pub events: Vec<Event<'a>>,
    pub checkout_completed: bool,
}

/// Build one session for `profile`, starting at `start`.
///
/// Draws, in order: product, quantity, completion flag, checkout shipping
/// country, and (only when the checkout completes) the order's shipping
/// country. Returns `None` if the catalog is empty.
pub fn plan_session<'a, R: Rng + ?Sized>(
    rng: &mut R,
    profile: &'a Profile,
    catalog: &'a [Product],
    shipping_countries: &'a [String],
    start: DateTime<Utc>,
) -> Option<SessionPlan<'a>> {
    let product = catalog.choose(rng)?;
    let quantity = rng.random_range(QUANTITY_RANGE);
    let step = TimeDelta::seconds(EVENT_SPACING_SECS);
    let mut cursor = start;
    let mut next_time = || {
        let time = cursor;
        cursor += step;
        time
    };

    let mut events = vec![
        Event::new(Metric::ActiveOnSite, profile, next_time()),
        Event::new(Metric::ViewedProduct, profile, next_time()).with_line(product, 1),
        Event::new(Metric::AddedToCart, profile, next_time()).with_line(product, quantity),
    ];

    let checkout_completed: bool = rng.random();
    events.push(
        Event::new(Metric::StartedCheckout, profile, next_time())
            .with_line(product, quantity)
            .with_checkout_completed(checkout_completed)
            .with_shipping_country(pick_country(rng, shipping_countries)),
    );

    if checkout_completed {
        events.push(
            Event::new(Metric::PlacedOrder, profile, next_time())
                .with_line(product, quantity)
                .with_shipping_country(pick_country(rng, shipping_countries)),
        );
    }

    Some(SessionPlan {
        events,
        checkout_completed,
    })
}

fn pick_country<'a, R: Rng + ?Sized>(rng: &mut R, countries: &'a [String]) -> Option<&'a str> {
    countries.choose(rng).map(String::as_str)
}

/// Counts gathered over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub users: u32,
    pub sessions: u32,
    pub orders_placed: u32,
    /// Events handed to the sink, per metric.
    pub events: BTreeMap<Metric, u32>,
    pub accepted: u32,
    pub rejected: u32,
    pub failed: u32,
    pub skipped: u32,
}

impl SimulationReport {
    /// Total events handed to the sink.
    #[must_use]
    pub fn events_attempted(&self) -> u32 {
        self.events.values().sum()
    }

    fn record(&mut self, metric: Metric, delivery: Delivery) {
        *self.events.entry(metric).or_default() += 1;
        match delivery {
            Delivery::Accepted { .. } => self.accepted += 1,
            Delivery::Rejected { .. } => self.rejected += 1,
            Delivery::Failed => self.failed += 1,
            Delivery::Skipped => self.skipped += 1,
        }
    }
}

/// Drives synthetic users through their sessions.
pub struct Simulator<'a, S, C = SystemClock> {
    sink: &'a S,
    clock: C,
    catalog: &'a [Product],
    num_users: u32,
    window: TimestampWindow,
    shipping_countries: Vec<String>,
    rng: StdRng,
}

impl<'a, S: EventSink> Simulator<'a, S> {
    /// Simulator reading the system clock.
    #[must_use]
    pub fn new(config: &SimulationConfig, catalog: &'a [Product], sink: &'a S) -> Self {
        Self::with_clock(config, catalog, sink, SystemClock)
    }
}

impl<'a, S: EventSink, C: Clock> Simulator<'a, S, C> {
    /// Simulator reading "now" from `clock`.
    ///
    /// Seeds the RNG from `config.seed`, or from the OS when unset.
    #[must_use]
    pub fn with_clock(
        config: &SimulationConfig,
        catalog: &'a [Product],
        sink: &'a S,
        clock: C,
    ) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        Self {
            sink,
            clock,
            catalog,
            num_users: config.num_users,
            window: TimestampWindow::days(config.lookback_days),
            shipping_countries: config.shipping_countries.clone(),
            rng,
        }
    }

    /// Simulate every user, emitting each session's events in order.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::EmptyCatalog` when users are requested but
    /// the catalog has no products. Nothing is sent in that case.
    pub async fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        if self.num_users > 0 && self.catalog.is_empty() {
            return Err(SimulationError::EmptyCatalog(self.num_users));
        }

        let mut report = SimulationReport::default();
        info!(users = self.num_users, products = self.catalog.len(), "Starting simulation");

        for user in 0..self.num_users {
            let profile = generate_profile(&mut self.rng);
            let sessions = self.rng.random_range(SESSIONS_PER_USER);
            info!(user, email = %profile.email, sessions, "Simulating user");

            for session in 0..sessions {
                let start = self.window.sample(self.clock.now(), &mut self.rng);
                let Some(plan) = plan_session(
                    &mut self.rng,
                    &profile,
                    self.catalog,
                    &self.shipping_countries,
                    start,
                ) else {
                    break;
                };
                debug!(
                    user,
                    session,
                    events = plan.events.len(),
                    checkout_completed = plan.checkout_completed,
                    "Planned session"
                );

                for event in &plan.events {
                    let delivery = self.sink.deliver(event).await;
                    report.record(event.metric, delivery);
                }

                report.sessions += 1;
                if plan.checkout_completed {
                    report.orders_placed += 1;
                }
            }
            report.users += 1;
        }

        info!(
            users = report.users,
            sessions = report.sessions,
            events = report.events_attempted(),
            accepted = report.accepted,
            rejected = report.rejected,
            failed = report.failed,
            "Simulation complete"
        );
        Ok(report)
    }
}
