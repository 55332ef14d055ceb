//! Receive-stock draft engine
//!
//! Manages several concurrent, uncommitted stock-receiving drafts (tabs)
//! for a branch back-office: line-item math that keeps quantity, unit
//! price, discount and subtotal consistent under arbitrary edit order,
//! price-tier derivation with per-field manual latches, durable
//! persistence reconciled against the live catalog, re-hydration of
//! committed receipts into editable drafts, and validated commits.
//!
//! # Architecture
//!
//! ```text
//! services::CatalogService ──┐
//! services::InventoryApi  ──┤
//!                            ▼
//! drafts::DraftStore  (single writer, snapshot/subscribe, save-on-mutate)
//!     └─ drafts::DraftSessionManager   (pure tab/session state machine)
//!            └─ pricing::line_math     (reverse-solve algebra)
//!                   └─ pricing::derivation (wholesale/retail tiers)
//!
//! drafts::InventoryImporter  — committed receipt → editable draft
//! drafts::SaveCoordinator    — validate + commit + reset
//! drafts::SettingsStore      — per-branch calculation toggles
//! ```

pub mod config;
pub mod drafts;
pub mod logger;
pub mod pricing;
pub mod services;

pub use config::Config;
pub use drafts::{
    DraftError, DraftEvent, DraftResult, DraftSessionManager, DraftStorage, DraftStore,
    InventoryImporter, ItemUpdate, SaveCoordinator, SettingsStore, StorageError, TabTotals,
};
pub use services::{
    CatalogService, InMemoryInventoryApi, InMemorySuppliers, InventoryApi, SupplierProvider,
};
