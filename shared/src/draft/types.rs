//! Small value types shared by draft sessions

use serde::{Deserialize, Serialize};

/// Payment type of a receive-stock transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[default]
    Cash,
    /// On account; requires a supplier at commit time
    Credit,
}

/// Kind of an invoice-level discount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    #[default]
    None,
    Percentage,
    Fixed,
}

/// Discount applied to the whole draft total, distinct from per-item
/// discounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct InvoiceDiscount {
    pub kind: DiscountKind,
    pub value: f64,
}

impl InvoiceDiscount {
    pub fn percentage(value: f64) -> Self {
        Self {
            kind: DiscountKind::Percentage,
            value,
        }
    }

    pub fn fixed(value: f64) -> Self {
        Self {
            kind: DiscountKind::Fixed,
            value,
        }
    }
}

/// Per-field manual-edit latch for derived prices.
///
/// `Pinned` means the user supplied an explicit value; auto-derivation
/// must never overwrite the field again. There is no automatic reset: the
/// "Recalculate" action force-recomputes the value but leaves the latch
/// in place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSource {
    #[default]
    Auto,
    Pinned,
}

impl PriceSource {
    pub fn is_pinned(&self) -> bool {
        matches!(self, PriceSource::Pinned)
    }
}
