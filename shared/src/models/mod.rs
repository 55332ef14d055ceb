//! Catalog, supplier, branch and receipt models

mod branch;
mod product;
mod receipt;
mod supplier;

pub use branch::BranchPricingPolicy;
pub use product::{Product, StockLevel};
pub use receipt::{
    CommitOutcome, PayloadLine, ProductDoc, ProductRef, ReceiptLine, ReceiveStockPayload,
    ReceiveStockRecord,
};
pub use supplier::{NewSupplier, Supplier};
