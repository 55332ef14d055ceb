//! Draft session and line item state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{InvoiceDiscount, PaymentType, PriceSource};

/// A product line within a draft session.
///
/// `quantity`, `unit_price`, `discount_percent` and `subtotal` are kept
/// mutually consistent by the engine's line math; `pinned_subtotal` marks
/// an explicitly entered subtotal that reverse-solves the unit price
/// instead of re-deriving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: String,
    /// Name snapshot taken when the product was selected
    pub product_name: String,
    /// Whole units received
    pub quantity: i64,
    /// Purchase price per unit, 2dp
    pub unit_price: f64,
    /// Per-item discount percent, clamped to [0, 100]
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
    /// Displayed line subtotal, 2dp
    #[serde(default)]
    pub subtotal: f64,
    /// Explicitly entered subtotal, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_subtotal: Option<f64>,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: f64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount_percent: 0.0,
            wholesale_price: None,
            retail_price: None,
            credit_price: None,
            price_source: PriceSource::Auto,
            wholesale_source: PriceSource::Auto,
            retail_source: PriceSource::Auto,
            credit_source: PriceSource::Auto,
            subtotal: 0.0,
            pinned_subtotal: None,
        }
    }
}

/// One in-progress, uncommitted stock-receiving transaction (tab).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftSession {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_date: Option<NaiveDate>,
    #[serde(default)]
    pub discount: InvoiceDiscount,
    /// Re-hydrated from a committed receipt; commits update instead of create
    #[serde(default)]
    pub is_edit_mode: bool,
    /// Id of the committed receipt this draft was imported from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_receipt_id: Option<String>,
    /// Commit in flight; transient, never persisted
    #[serde(skip)]
    pub is_saving: bool,
}

impl DraftSession {
    /// New empty session: cash payment, dated today.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            supplier_id: None,
            items: Vec::new(),
            payment_type: PaymentType::Cash,
            receive_date: Some(today),
            discount: InvoiceDiscount::default(),
            is_edit_mode: false,
            source_receipt_id: None,
            is_saving: false,
        }
    }

    /// Clear mutable fields after a successful commit, preserving the
    /// session's identity and tab slot.
    pub fn reset(&mut self, today: NaiveDate) {
        self.supplier_id = None;
        self.items.clear();
        self.payment_type = PaymentType::Cash;
        self.receive_date = Some(today);
        self.discount = InvoiceDiscount::default();
        self.is_edit_mode = false;
        self.source_receipt_id = None;
        self.is_saving = false;
    }

    pub fn has_source(&self, receipt_id: &str) -> bool {
        self.source_receipt_id.as_deref() == Some(receipt_id)
    }
}
