//! Supplier provider seam
//!
//! Listing backs the supplier picker; quick-create returns the stored
//! supplier so the caller can select it in place.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{NewSupplier, Supplier};
use uuid::Uuid;

#[async_trait]
pub trait SupplierProvider: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Supplier>>;

    /// Create a supplier and return it with its assigned id.
    async fn create(&self, supplier: NewSupplier) -> anyhow::Result<Supplier>;
}

/// In-memory implementation for tests and offline operation.
#[derive(Default)]
pub struct InMemorySuppliers {
    suppliers: Mutex<Vec<Supplier>>,
}

impl InMemorySuppliers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, suppliers: Vec<Supplier>) {
        *self.suppliers.lock() = suppliers;
    }
}

#[async_trait]
impl SupplierProvider for InMemorySuppliers {
    async fn list(&self) -> anyhow::Result<Vec<Supplier>> {
        Ok(self.suppliers.lock().clone())
    }

    async fn create(&self, supplier: NewSupplier) -> anyhow::Result<Supplier> {
        let stored = Supplier {
            id: Uuid::new_v4().to_string(),
            name: supplier.name,
            phone: supplier.phone,
            address: supplier.address,
        };
        self.suppliers.lock().push(stored.clone());
        Ok(stored)
    }
}
