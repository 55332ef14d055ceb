//! External data services
//!
//! The draft engine itself is transport-agnostic: the catalog and the
//! commit API are seams. Production wires real providers behind the
//! traits here; tests wire the in-memory ones.

pub mod catalog;
pub mod inventory_api;
pub mod suppliers;

pub use catalog::CatalogService;
pub use inventory_api::{InMemoryInventoryApi, InventoryApi};
pub use suppliers::{InMemorySuppliers, SupplierProvider};
