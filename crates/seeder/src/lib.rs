//! Journey seeder library.
//!
//! Generates synthetic eyewear customers, walks each one through a handful
//! of shopping sessions built from a product feed, and posts the resulting
//! events to Klaviyo so a demo account has realistic browse, cart and order
//! history to segment on.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod klaviyo;
pub mod profile;
pub mod simulator;
pub mod sink;

pub use catalog::{load_catalog, parse_catalog};
pub use config::{KlaviyoConfig, SeederConfig, SimulationConfig};
pub use error::Error;
pub use klaviyo::KlaviyoClient;
pub use simulator::{SimulationReport, Simulator};
pub use sink::{Delivery, DryRunSink, EventSink};
