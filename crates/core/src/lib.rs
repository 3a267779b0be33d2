//! Journey Seeder Core - Shared domain types.
//!
//! This crate provides the types used across the seeder components:
//! - `seeder` - Catalog loading, data generation, Klaviyo delivery
//! - `cli` - Command-line entry point
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Random sampling for the preference enumerations lives here as
//! [`rand::distr::Distribution`] impls so generators can draw them directly.
//!
//! # Modules
//!
//! - [`types`] - Products, profiles, events, emails and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
