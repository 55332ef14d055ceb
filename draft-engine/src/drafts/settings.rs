//! Per-branch settings store
//!
//! Same hydrate-once / write-on-change pattern as the draft store.
//! Stored values merge over hard defaults at deserialization, so old
//! payloads pick up defaults for keys added since they were written.

use parking_lot::RwLock;
use shared::PriceSettings;
use std::sync::atomic::{AtomicBool, Ordering};

use super::storage::DraftStorage;

pub struct SettingsStore {
    storage: DraftStorage,
    branch_id: String,
    state: RwLock<PriceSettings>,
    hydrated: AtomicBool,
}

impl SettingsStore {
    pub fn new(storage: DraftStorage, branch_id: impl Into<String>) -> Self {
        Self {
            storage,
            branch_id: branch_id.into(),
            state: RwLock::new(PriceSettings::default()),
            hydrated: AtomicBool::new(false),
        }
    }

    /// Load stored settings once; later calls are no-ops.
    pub fn hydrate(&self) {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.storage.load_settings(&self.branch_id) {
            Ok(Some(settings)) => *self.state.write() = settings,
            Ok(None) => {}
            Err(e) => {
                tracing::error!(branch_id = %self.branch_id, error = %e, "Failed to load settings");
            }
        }
    }

    pub fn get(&self) -> PriceSettings {
        *self.state.read()
    }

    /// Mutate the settings and write them back. The write is
    /// fire-and-forget: failures are logged and the in-memory value
    /// stands.
    pub fn update(&self, op: impl FnOnce(&mut PriceSettings)) -> PriceSettings {
        let updated = {
            let mut state = self.state.write();
            op(&mut state);
            *state
        };
        if let Err(e) = self.storage.store_settings(&self.branch_id, &updated) {
            tracing::error!(branch_id = %self.branch_id, error = %e, "Failed to persist settings");
        }
        updated
    }
}
