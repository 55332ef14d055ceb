//! Shared types for the branch back-office
//!
//! Domain models used across the workspace: catalog and supplier records,
//! branch pricing policy, committed receipt records, and the draft-session
//! types that the receive-stock engine mutates. This crate is pure data:
//! no I/O, no storage, no network.

pub mod draft;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use draft::{
    DiscountKind, DraftSession, InvoiceDiscount, LineItem, PaymentType, PersistedLine,
    PersistedTab, PriceSettings, PriceSource,
};
pub use models::{
    BranchPricingPolicy, CommitOutcome, NewSupplier, PayloadLine, Product, ProductDoc, ProductRef,
    ReceiptLine, ReceiveStockPayload, ReceiveStockRecord, StockLevel, Supplier,
};
