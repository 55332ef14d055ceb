//! Live catalog cache
//!
//! Holds the latest product and stock snapshots for one branch. Both
//! feeds refresh out-of-band and may arrive at different times; readers
//! always see whichever snapshot is newest.

use parking_lot::RwLock;
use shared::{Product, StockLevel};
use std::collections::HashMap;

/// Read-through cache over the branch catalog and its live stock feed.
#[derive(Default)]
pub struct CatalogService {
    products: RwLock<HashMap<String, Product>>,
    stock: RwLock<HashMap<String, StockLevel>>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the product snapshot.
    pub fn refresh_products(&self, products: Vec<Product>) {
        let map = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        *self.products.write() = map;
    }

    /// Replace the live stock snapshot.
    pub fn refresh_stock(&self, levels: Vec<StockLevel>) {
        let map = levels
            .into_iter()
            .map(|s| (s.product_id.clone(), s))
            .collect();
        *self.stock.write() = map;
    }

    pub fn product(&self, product_id: &str) -> Option<Product> {
        self.products.read().get(product_id).cloned()
    }

    pub fn product_name(&self, product_id: &str) -> Option<String> {
        self.products.read().get(product_id).map(|p| p.name.clone())
    }

    pub fn stock(&self, product_id: &str) -> Option<StockLevel> {
        self.stock.read().get(product_id).cloned()
    }

    /// The authoritative base price for a product: live stock price
    /// first, static catalog price as fallback. `None` when neither
    /// snapshot carries one.
    pub fn live_base_price(&self, product_id: &str) -> Option<f64> {
        if let Some(price) = self.stock.read().get(product_id).and_then(|s| s.price) {
            return Some(price);
        }
        self.products.read().get(product_id).and_then(|p| p.price)
    }
}
