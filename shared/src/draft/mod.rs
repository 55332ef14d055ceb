//! Draft-session types for the receive-stock engine
//!
//! A draft session is one in-progress, uncommitted stock-receiving
//! transaction ("tab"). These types carry the in-memory state the engine
//! mutates plus the persisted forms written to durable storage.

mod session;
mod settings;
mod snapshot;
mod types;

pub use session::{DraftSession, LineItem};
pub use settings::PriceSettings;
pub use snapshot::{PersistedLine, PersistedTab};
pub use types::{DiscountKind, InvoiceDiscount, PaymentType, PriceSource};
