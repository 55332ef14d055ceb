//! redb-based storage for draft snapshots and settings
//!
//! # Keys
//!
//! One string table holds JSON values under per-branch keys:
//!
//! | Key | Value |
//! |-----|-------|
//! | `receiveStockTabs-{branchId}` | `Vec<PersistedTab>` |
//! | `receiveStockActiveTabId-{branchId}` | active session id |
//! | `receiveStock-settings-{branchId}` | `PriceSettings` |
//!
//! Writes are save-on-mutate from the store layer; the store treats
//! failures as non-fatal (logged, in-memory state keeps operating).
//! Malformed stored payloads are dropped on load, not raised: draft
//! availability is favored over strict completeness.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::{PersistedTab, PriceSettings};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Single table for draft state: key = per-branch string key, value = JSON
const DRAFTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("receive_stock");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Draft snapshot storage backed by redb.
#[derive(Clone)]
pub struct DraftStorage {
    db: Arc<Database>,
}

impl DraftStorage {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DRAFTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DRAFTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DRAFTS_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DRAFTS_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    // ========== Tabs ==========

    pub fn store_tabs(&self, branch_id: &str, tabs: &[PersistedTab]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(tabs)?;
        self.put(&tabs_key(branch_id), &bytes)
    }

    /// Load persisted tabs. Malformed payloads are logged and treated as
    /// absent.
    pub fn load_tabs(&self, branch_id: &str) -> StorageResult<Option<Vec<PersistedTab>>> {
        let Some(bytes) = self.get(&tabs_key(branch_id))? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(tabs) => Ok(Some(tabs)),
            Err(e) => {
                tracing::warn!(branch_id = %branch_id, error = %e, "Dropping malformed draft snapshot");
                Ok(None)
            }
        }
    }

    // ========== Active Tab ==========

    pub fn store_active_id(&self, branch_id: &str, active_id: &str) -> StorageResult<()> {
        let bytes = serde_json::to_vec(active_id)?;
        self.put(&active_key(branch_id), &bytes)
    }

    pub fn load_active_id(&self, branch_id: &str) -> StorageResult<Option<String>> {
        let Some(bytes) = self.get(&active_key(branch_id))? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                tracing::warn!(branch_id = %branch_id, error = %e, "Dropping malformed active tab id");
                Ok(None)
            }
        }
    }

    // ========== Settings ==========

    pub fn store_settings(&self, branch_id: &str, settings: &PriceSettings) -> StorageResult<()> {
        let bytes = serde_json::to_vec(settings)?;
        self.put(&settings_key(branch_id), &bytes)
    }

    /// Load persisted settings. Missing or malformed payloads yield
    /// `None`; stored fields merge over defaults at deserialization.
    pub fn load_settings(&self, branch_id: &str) -> StorageResult<Option<PriceSettings>> {
        let Some(bytes) = self.get(&settings_key(branch_id))? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                tracing::warn!(branch_id = %branch_id, error = %e, "Dropping malformed settings payload");
                Ok(None)
            }
        }
    }
}

fn tabs_key(branch_id: &str) -> String {
    format!("receiveStockTabs-{branch_id}")
}

fn active_key(branch_id: &str) -> String {
    format!("receiveStockActiveTabId-{branch_id}")
}

fn settings_key(branch_id: &str) -> String {
    format!("receiveStock-settings-{branch_id}")
}
