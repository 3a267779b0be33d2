//! Journey events and the metrics they report.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::price::line_total;
use super::product::Product;
use super::profile::Profile;

/// Klaviyo metric name for a journey step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Metric {
    #[serde(rename = "Active on Site")]
    ActiveOnSite,
    #[serde(rename = "Viewed Product")]
    ViewedProduct,
    #[serde(rename = "Added to Cart")]
    AddedToCart,
    #[serde(rename = "Started Checkout")]
    StartedCheckout,
    #[serde(rename = "Placed Order")]
    PlacedOrder,
}

impl Metric {
    /// Every metric, in session order.
    pub const ALL: [Self; 5] = [
        Self::ActiveOnSite,
        Self::ViewedProduct,
        Self::AddedToCart,
        Self::StartedCheckout,
        Self::PlacedOrder,
    ];

    /// Metric name as Klaviyo displays it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveOnSite => "Active on Site",
            Self::ViewedProduct => "Viewed Product",
            Self::AddedToCart => "Added to Cart",
            Self::StartedCheckout => "Started Checkout",
            Self::PlacedOrder => "Placed Order",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product together with the quantity an event refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItem<'a> {
    pub product: &'a Product,
    pub quantity: u32,
}

impl LineItem<'_> {
    /// Unit price times quantity, rounded to cents.
    #[must_use]
    pub fn total(&self) -> f64 {
        line_total(self.product.price, self.quantity)
    }
}

/// One action record bound for the event endpoint.
///
/// Borrows the profile and product it describes; both outlive the session
/// that produced the event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'a> {
    pub metric: Metric,
    pub profile: &'a Profile,
    pub time: DateTime<Utc>,
    pub line: Option<LineItem<'a>>,
    pub shipping_country: Option<&'a str>,
    /// Only set on [`Metric::StartedCheckout`].
    pub checkout_completed: Option<bool>,
}

impl<'a> Event<'a> {
    /// An event with no product context.
    #[must_use]
    pub const fn new(metric: Metric, profile: &'a Profile, time: DateTime<Utc>) -> Self {
        Self {
            metric,
            profile,
            time,
            line: None,
            shipping_country: None,
            checkout_completed: None,
        }
    }

    /// Attach a product and quantity.
    #[must_use]
    pub const fn with_line(mut self, product: &'a Product, quantity: u32) -> Self {
        self.line = Some(LineItem { product, quantity });
        self
    }

    /// Attach a shipping country.
    #[must_use]
    pub const fn with_shipping_country(mut self, country: Option<&'a str>) -> Self {
        self.shipping_country = country;
        self
    }

    /// Record whether the checkout went on to complete.
    #[must_use]
    pub const fn with_checkout_completed(mut self, completed: bool) -> Self {
        self.checkout_completed = Some(completed);
        self
    }

    /// Monetary value: the line total when a product is attached, else zero.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.line.as_ref().map_or(0.0, LineItem::total)
    }
}
