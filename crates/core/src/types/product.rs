//! Catalog product record.

use serde::Serialize;

/// A product from the demo catalog feed.
///
/// Loaded once and shared read-only for the whole run. No range checks are
/// applied: a negative price in the feed stays negative here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Catalog identifier (kept as text, feeds use SKUs and numbers alike).
    pub id: String,
    pub title: String,
    /// Unit price in the store currency.
    pub price: f64,
    pub category: String,
    /// Canonical product page URL.
    pub url: String,
    pub image_url: String,
    pub inventory: u32,
    pub rating: f64,
}
