//! Draft engine errors
//!
//! Validation errors are field-scoped: they block only the offending
//! action and leave all draft state unchanged.

use thiserror::Error;

use super::storage::StorageError;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("item index out of range: {0}")]
    ItemNotFound(usize),

    #[error("quantity must be a whole number greater than zero")]
    InvalidQuantity,

    #[error("unit price must be zero or greater")]
    InvalidUnitPrice,

    #[error("a supplier is required for credit purchases")]
    SupplierRequired,

    #[error("a receive date is required")]
    ReceiveDateRequired,

    #[error("a save is already in flight for this draft")]
    SaveInFlight,

    #[error("commit rejected: {0}")]
    CommitRejected(String),

    #[error("inventory record not found: {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DraftError {
    /// The form field a validation error is scoped to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DraftError::InvalidQuantity => Some("quantity"),
            DraftError::InvalidUnitPrice => Some("unit_price"),
            DraftError::SupplierRequired => Some("supplier"),
            DraftError::ReceiveDateRequired => Some("receive_date"),
            _ => None,
        }
    }
}

pub type DraftResult<T> = Result<T, DraftError>;
