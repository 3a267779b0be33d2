//! Core types for the journey seeder.
//!
//! This module provides type-safe wrappers for the seeded domain concepts.

pub mod email;
pub mod event;
pub mod id;
pub mod price;
pub mod product;
pub mod profile;

pub use email::{DEMO_EMAIL_DOMAIN, Email, EmailError};
pub use event::{Event, LineItem, Metric};
pub use id::ProfileId;
pub use price::line_total;
pub use product::Product;
pub use profile::*;
