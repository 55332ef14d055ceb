//! Committed receive-stock records and commit payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::draft::{InvoiceDiscount, PaymentType};

/// Product reference inside a stored receipt line.
///
/// Older records store a bare product id; newer ones embed a populated
/// sub-document. Both deserialize here and resolve to the live catalog by
/// id at import time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProductRef {
    Id(String),
    Populated(ProductDoc),
}

impl ProductRef {
    /// The referenced product id, whichever shape was stored.
    pub fn id(&self) -> &str {
        match self {
            ProductRef::Id(id) => id,
            ProductRef::Populated(doc) => &doc.id,
        }
    }
}

/// Embedded product sub-document variant of [`ProductRef`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDoc {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One line of a committed receive-stock record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product: ProductRef,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_price: Option<f64>,
    /// Committed line total (already discounted, 2dp)
    pub total: f64,
}

/// A committed receive-stock record as returned by the commit API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveStockRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    pub payment_type: PaymentType,
    pub receive_date: NaiveDate,
    #[serde(default)]
    pub discount: InvoiceDiscount,
    pub items: Vec<ReceiptLine>,
    pub total_cost: f64,
}

/// One line of a commit payload. References the product by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_price: Option<f64>,
    /// Committed line total: `round2(quantity * unit_price * (1 - discount/100))`
    pub total: f64,
}

/// Payload for `create_receive_stock` / `update_inventory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveStockPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    pub payment_type: PaymentType,
    pub receive_date: NaiveDate,
    #[serde(default)]
    pub discount: InvoiceDiscount,
    pub items: Vec<PayloadLine>,
    /// Invoice-discounted total, supplied by the caller
    pub total_cost: f64,
}

/// Commit API outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommitOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
