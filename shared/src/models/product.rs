//! Catalog product and live stock models

use serde::{Deserialize, Serialize};

/// A product as served by the catalog provider.
///
/// The catalog is refreshed out-of-band; a product's static prices are the
/// values captured at the last refresh. Live prices ride on [`StockLevel`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Stable catalog id
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Product type / category label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Static base (purchase) price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price: Option<f64>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manufacturer: None,
            product_type: None,
            size: None,
            price,
            wholesale_price: None,
            retail_price: None,
        }
    }
}

/// One entry of the live stock feed, parallel to the catalog.
///
/// Carries the authoritative live prices for a product. Refreshed
/// out-of-band together with current stock counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLevel {
    pub product_id: String,
    /// Units currently on hand at the branch
    pub current_stock: i64,
    /// Live base (purchase) price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price: Option<f64>,
}
