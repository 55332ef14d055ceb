//! Persisted draft forms
//!
//! The durable snapshot of a draft session references products by id
//! only; names and live prices are re-resolved against the catalog on
//! hydration. Items whose product id no longer exists in the catalog are
//! dropped by the caller, not resurrected.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DraftSession, InvoiceDiscount, LineItem, PaymentType, PriceSource};

/// Persisted form of a [`LineItem`], product referenced by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedLine {
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
    #[serde(default)]
    pub price_source: PriceSource,
    #[serde(default)]
    pub wholesale_source: PriceSource,
    #[serde(default)]
    pub retail_source: PriceSource,
    #[serde(default)]
    pub credit_source: PriceSource,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_subtotal: Option<f64>,
}

impl From<&LineItem> for PersistedLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            wholesale_price: item.wholesale_price,
            retail_price: item.retail_price,
            credit_price: item.credit_price,
            price_source: item.price_source,
            wholesale_source: item.wholesale_source,
            retail_source: item.retail_source,
            credit_source: item.credit_source,
            subtotal: item.subtotal,
            pinned_subtotal: item.pinned_subtotal,
        }
    }
}

impl PersistedLine {
    /// Rebuild the in-memory line, given the product name resolved from
    /// the live catalog.
    pub fn into_item(self, product_name: impl Into<String>) -> LineItem {
        LineItem {
            product_id: self.product_id,
            product_name: product_name.into(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            wholesale_price: self.wholesale_price,
            retail_price: self.retail_price,
            credit_price: self.credit_price,
            price_source: self.price_source,
            wholesale_source: self.wholesale_source,
            retail_source: self.retail_source,
            credit_source: self.credit_source,
            subtotal: self.subtotal,
            pinned_subtotal: self.pinned_subtotal,
        }
    }
}

/// Persisted form of a [`DraftSession`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedTab {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_date: Option<NaiveDate>,
    #[serde(default)]
    pub discount: InvoiceDiscount,
    #[serde(default)]
    pub is_edit_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_receipt_id: Option<String>,
    pub items: Vec<PersistedLine>,
}

impl From<&DraftSession> for PersistedTab {
    fn from(session: &DraftSession) -> Self {
        Self {
            id: session.id.clone(),
            supplier_id: session.supplier_id.clone(),
            payment_type: session.payment_type,
            receive_date: session.receive_date,
            discount: session.discount,
            is_edit_mode: session.is_edit_mode,
            source_receipt_id: session.source_receipt_id.clone(),
            items: session.items.iter().map(PersistedLine::from).collect(),
        }
    }
}

impl PersistedTab {
    /// Rebuild the in-memory session, resolving each item's product id
    /// through `resolve_name`. Items that resolve to `None` are dropped;
    /// the catalog is authoritative.
    pub fn into_session(self, mut resolve_name: impl FnMut(&str) -> Option<String>) -> DraftSession {
        let items = self
            .items
            .into_iter()
            .filter_map(|line| {
                let name = resolve_name(&line.product_id)?;
                Some(line.into_item(name))
            })
            .collect();

        DraftSession {
            id: self.id,
            supplier_id: self.supplier_id,
            items,
            payment_type: self.payment_type,
            receive_date: self.receive_date,
            discount: self.discount,
            is_edit_mode: self.is_edit_mode,
            source_receipt_id: self.source_receipt_id,
            is_saving: false,
        }
    }
}
