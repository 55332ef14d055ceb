//! Inventory commit API seam
//!
//! Create/update calls return a [`CommitOutcome`] rather than an error
//! for business rejections; transport failures surface as `Err`.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{CommitOutcome, ReceiveStockPayload, ReceiveStockRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Commit a new receive-stock record.
    async fn create_receive_stock(
        &self,
        payload: &ReceiveStockPayload,
    ) -> anyhow::Result<CommitOutcome>;

    /// Overwrite an existing record (edit-mode commit).
    async fn update_inventory(
        &self,
        record_id: &str,
        payload: &ReceiveStockPayload,
    ) -> anyhow::Result<CommitOutcome>;

    /// Fetch a committed record for re-import.
    async fn get_inventory_by_id(&self, record_id: &str)
        -> anyhow::Result<Option<ReceiveStockRecord>>;
}

/// In-memory implementation for tests and offline operation.
#[derive(Default)]
pub struct InMemoryInventoryApi {
    records: Mutex<HashMap<String, ReceiveStockRecord>>,
    created: Mutex<Vec<ReceiveStockPayload>>,
    updated: Mutex<Vec<(String, ReceiveStockPayload)>>,
    fail_next: AtomicBool,
}

impl InMemoryInventoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a committed record so `get_inventory_by_id` can serve it.
    pub fn insert_record(&self, record: ReceiveStockRecord) {
        self.records.lock().insert(record.id.clone(), record);
    }

    /// Make the next commit call come back rejected.
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn created(&self) -> Vec<ReceiveStockPayload> {
        self.created.lock().clone()
    }

    pub fn updated(&self) -> Vec<(String, ReceiveStockPayload)> {
        self.updated.lock().clone()
    }

    fn outcome(&self) -> CommitOutcome {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            CommitOutcome::rejected("injected failure")
        } else {
            CommitOutcome::ok()
        }
    }
}

#[async_trait]
impl InventoryApi for InMemoryInventoryApi {
    async fn create_receive_stock(
        &self,
        payload: &ReceiveStockPayload,
    ) -> anyhow::Result<CommitOutcome> {
        let outcome = self.outcome();
        if outcome.success {
            self.created.lock().push(payload.clone());
        }
        Ok(outcome)
    }

    async fn update_inventory(
        &self,
        record_id: &str,
        payload: &ReceiveStockPayload,
    ) -> anyhow::Result<CommitOutcome> {
        let outcome = self.outcome();
        if outcome.success {
            self.updated
                .lock()
                .push((record_id.to_string(), payload.clone()));
        }
        Ok(outcome)
    }

    async fn get_inventory_by_id(
        &self,
        record_id: &str,
    ) -> anyhow::Result<Option<ReceiveStockRecord>> {
        Ok(self.records.lock().get(record_id).cloned())
    }
}
