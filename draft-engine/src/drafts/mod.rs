//! Draft lifecycle: session manager, durable store, import and commit

mod error;
mod importer;
mod manager;
mod save;
mod settings;
mod storage;
mod store;

pub use error::{DraftError, DraftResult};
pub use importer::InventoryImporter;
pub use manager::{DraftSessionManager, ItemUpdate};
pub use save::SaveCoordinator;
pub use settings::SettingsStore;
pub use storage::{DraftStorage, StorageError};
pub use store::{DraftEvent, DraftStore};

pub use crate::pricing::line_math::TabTotals;
