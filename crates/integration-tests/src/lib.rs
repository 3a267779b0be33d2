//! Integration tests for the journey seeder.
//!
//! Every test runs the real catalog loader, simulator and Klaviyo client
//! against a `wiremock` server standing in for `https://a.klaviyo.com/api`,
//! so no network access or API key is needed.
//!
//! ```bash
//! cargo test -p journey-seeder-integration-tests
//! ```
//!
//! This crate holds the shared fixtures; the tests live under `tests/`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;
use wiremock::MockServer;

/// Syntactically valid key that passes placeholder and entropy checks.
pub const TEST_API_KEY: &str = "pk_4e9Bd02cA71f3E8b5a6C9d0F2e7B1a3D";

/// Small eyewear feed with one product per category.
pub const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<products>
  <product>
    <id>42</id>
    <title>Aviator Classic</title>
    <price>89.99</price>
    <category>Sunglasses</category>
    <url>https://shop.example/aviator-classic</url>
    <image_url>https://shop.example/img/aviator.jpg</image_url>
    <inventory>25</inventory>
    <rating>4.6</rating>
  </product>
  <product>
    <id>108</id>
    <title>Round Reader &amp; Case</title>
    <price>45.00</price>
    <category>Glasses</category>
    <url>https://shop.example/round-reader</url>
    <image_url>https://shop.example/img/round-reader.jpg</image_url>
    <inventory>0</inventory>
    <rating>4.2</rating>
  </product>
  <product>
    <id>7</id>
    <title>Daily Lenses 30 Pack</title>
    <price>24.50</price>
    <category>Contact Lenses</category>
    <url>https://shop.example/daily-30</url>
    <image_url>https://shop.example/img/daily-30.jpg</image_url>
    <inventory>400</inventory>
    <rating>4.1</rating>
  </product>
</products>
"#;

/// A feed written to a temporary directory that lives as long as this value.
pub struct FeedFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl FeedFixture {
    /// Write `xml` to `product_feed.xml` in a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be created.
    pub fn new(xml: &str) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("product_feed.xml");
        std::fs::write(&path, xml)?;
        Ok(Self { _dir: dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Environment for a live run pointed at `server`.
#[must_use]
pub fn env_for(server: &MockServer, feed: &Path, users: u32, seed: u64) -> HashMap<String, String> {
    HashMap::from([
        ("KLAVIYO_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ("KLAVIYO_BASE_URL".to_string(), format!("{}/api", server.uri())),
        ("SEEDER_NUM_USERS".to_string(), users.to_string()),
        ("SEEDER_PRODUCT_FEED".to_string(), feed.display().to_string()),
        ("SEEDER_RNG_SEED".to_string(), seed.to_string()),
    ])
}

/// JSON bodies of every request `server` received, in arrival order.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.body_json::<Value>().ok())
        .collect()
}

/// Metric name of a Create Event body.
#[must_use]
pub fn metric_name(body: &Value) -> Option<&str> {
    body.pointer("/data/attributes/metric/data/attributes/name")?
        .as_str()
}

/// Profile email of a Create Event body.
#[must_use]
pub fn profile_email(body: &Value) -> Option<&str> {
    body.pointer("/data/attributes/profile/data/attributes/email")?
        .as_str()
}
