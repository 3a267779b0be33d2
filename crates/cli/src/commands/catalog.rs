//! Product feed inspection.

use std::collections::BTreeMap;
use std::path::PathBuf;

use journey_seeder::{SimulationConfig, load_catalog};
use journey_seeder_core::Product;
use tracing::{info, warn};

/// Aggregate view of a product feed.
#[derive(Debug, Default, PartialEq)]
pub struct CatalogSummary {
    pub products: usize,
    pub categories: BTreeMap<String, usize>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub out_of_stock: usize,
}

impl CatalogSummary {
    fn from_products(products: &[Product]) -> Self {
        let mut summary = Self {
            products: products.len(),
            ..Self::default()
        };
        for product in products {
            *summary
                .categories
                .entry(product.category.clone())
                .or_default() += 1;
            let price = product.price;
            summary.min_price = Some(summary.min_price.map_or(price, |p| p.min(price)));
            summary.max_price = Some(summary.max_price.map_or(price, |p| p.max(price)));
            if product.inventory == 0 {
                summary.out_of_stock += 1;
            }
        }
        summary
    }
}

/// Parse the feed and log a summary of its contents.
///
/// # Errors
///
/// Returns an error if `SEEDER_*` configuration is invalid or the feed
/// cannot be loaded.
pub async fn summarize(feed: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match feed {
        Some(path) => path,
        None => SimulationConfig::from_env()?.feed_path,
    };

    let products = load_catalog(&path).await?;
    let summary = CatalogSummary::from_products(&products);

    if summary.products == 0 {
        warn!(path = %path.display(), "Product feed has no products");
        return Ok(());
    }

    for (category, count) in &summary.categories {
        info!(category = %category, count, "Category");
    }
    info!(
        path = %path.display(),
        products = summary.products,
        categories = summary.categories.len(),
        min_price = summary.min_price,
        max_price = summary.max_price,
        out_of_stock = summary.out_of_stock,
        "Product feed parsed"
    );
    Ok(())
}
