//! Draft store - single-writer state with snapshot/subscribe
//!
//! Wraps the pure [`DraftSessionManager`] with:
//! - durable persistence as a save-on-mutate hook (fire-and-forget;
//!   storage failures are logged and the session keeps operating in
//!   memory),
//! - change broadcasting via [`DraftEvent`]s,
//! - hydrate-once reconciliation against the live catalog (repeated
//!   catalog refreshes never re-run hydration and clobber edits),
//! - the one-shot pending import consumed once hydration is done.

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use shared::{
    DraftSession, InvoiceDiscount, PaymentType, PersistedTab, PriceSettings, Product, StockLevel,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use super::error::DraftResult;
use super::manager::{DraftSessionManager, ItemUpdate};
use super::storage::DraftStorage;
use crate::pricing::line_math::TabTotals;
use crate::services::CatalogService;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Change notifications emitted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    /// Persisted state was reconciled and loaded
    Hydrated { sessions: usize },
    TabAdded { id: String },
    TabClosed { id: String },
    ActiveChanged { id: String },
    /// Fields or items of a session changed
    TabMutated { id: String },
    /// A committed receipt was re-hydrated into a new session
    Imported { id: String },
    /// The session committed successfully and was reset
    Committed { id: String },
}

/// Single-writer store over the draft sessions of one branch.
pub struct DraftStore {
    manager: RwLock<DraftSessionManager>,
    storage: DraftStorage,
    branch_id: String,
    hydrated: AtomicBool,
    /// Receipt id from the URL contract, consumed once after hydration
    pending_import: Mutex<Option<String>>,
    event_tx: broadcast::Sender<DraftEvent>,
}

impl DraftStore {
    pub fn new(
        storage: DraftStorage,
        branch_id: impl Into<String>,
        policy: shared::BranchPricingPolicy,
        settings: PriceSettings,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            manager: RwLock::new(DraftSessionManager::new(policy, settings)),
            storage,
            branch_id: branch_id.into(),
            hydrated: AtomicBool::new(false),
            pending_import: Mutex::new(None),
            event_tx,
        }
    }

    /// Queue a receipt id for import once catalog and hydration are
    /// ready (the `inventoryId` URL parameter).
    pub fn with_pending_import(self, inventory_id: Option<String>) -> Self {
        *self.pending_import.lock() = inventory_id;
        self
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<DraftEvent> {
        self.event_tx.subscribe()
    }

    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    // ========== Hydration ==========

    /// Load the persisted session list once, reconciling stored items
    /// against the live catalog. Items whose product id is absent are
    /// dropped silently; zero usable sessions keeps the default seed.
    ///
    /// Guarded: only the first call does anything.
    pub fn hydrate(&self, catalog: &CatalogService) {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return;
        }

        let tabs = match self.storage.load_tabs(&self.branch_id) {
            Ok(tabs) => tabs.unwrap_or_default(),
            Err(e) => {
                tracing::error!(branch_id = %self.branch_id, error = %e, "Failed to load draft snapshot");
                Vec::new()
            }
        };
        let active_id = self
            .storage
            .load_active_id(&self.branch_id)
            .unwrap_or_else(|e| {
                tracing::error!(branch_id = %self.branch_id, error = %e, "Failed to load active tab id");
                None
            });

        let mut dropped = 0usize;
        let sessions: Vec<DraftSession> = tabs
            .into_iter()
            .map(|tab: PersistedTab| {
                let before = tab.items.len();
                let session = tab.into_session(|product_id| catalog.product_name(product_id));
                dropped += before - session.items.len();
                session
            })
            .collect();
        if dropped > 0 {
            tracing::warn!(
                branch_id = %self.branch_id,
                dropped,
                "Dropped persisted items no longer present in the catalog"
            );
        }

        let count = sessions.len().max(1);
        self.manager.write().hydrate(sessions, active_id);
        self.emit(DraftEvent::Hydrated { sessions: count });
    }

    /// Take the queued import id, once, after hydration has run.
    pub fn take_pending_import(&self) -> Option<String> {
        if !self.hydrated.load(Ordering::SeqCst) {
            return None;
        }
        self.pending_import.lock().take()
    }

    // ========== Reads ==========

    pub fn snapshot(&self) -> Vec<DraftSession> {
        self.manager.read().sessions().to_vec()
    }

    pub fn active_id(&self) -> String {
        self.manager.read().active_id().to_string()
    }

    pub fn session(&self, id: &str) -> DraftResult<DraftSession> {
        Ok(self.manager.read().session(id)?.clone())
    }

    pub fn find_by_source(&self, receipt_id: &str) -> Option<String> {
        self.manager.read().find_by_source(receipt_id)
    }

    pub fn totals(&self, id: &str) -> DraftResult<TabTotals> {
        self.manager.read().totals(id)
    }

    // ========== Tab Lifecycle ==========

    pub fn add_tab(&self) -> String {
        let id = {
            let mut manager = self.manager.write();
            let id = manager.add_tab();
            self.persist(&manager);
            id
        };
        self.emit(DraftEvent::TabAdded { id: id.clone() });
        id
    }

    pub fn close_tab(&self, id: &str) {
        let closed = {
            let mut manager = self.manager.write();
            let before = manager.sessions().len();
            manager.close_tab(id);
            let closed = manager.sessions().len() < before;
            if closed {
                self.persist(&manager);
            }
            closed
        };
        if closed {
            self.emit(DraftEvent::TabClosed { id: id.to_string() });
        }
    }

    pub fn set_active_tab(&self, id: &str) -> DraftResult<()> {
        {
            let mut manager = self.manager.write();
            manager.set_active_tab(id)?;
            self.persist(&manager);
        }
        self.emit(DraftEvent::ActiveChanged { id: id.to_string() });
        Ok(())
    }

    /// Append an externally built session (import path) and activate it.
    pub fn append_session(&self, session: DraftSession) {
        let id = session.id.clone();
        {
            let mut manager = self.manager.write();
            manager.append_session(session);
            self.persist(&manager);
        }
        self.emit(DraftEvent::Imported { id });
    }

    // ========== Session Fields ==========

    pub fn set_supplier(&self, id: &str, supplier_id: Option<String>) -> DraftResult<()> {
        self.mutate(id, |m| m.set_supplier(id, supplier_id.clone()))
    }

    pub fn set_date(&self, id: &str, date: NaiveDate) -> DraftResult<()> {
        self.mutate(id, |m| m.set_date(id, date))
    }

    pub fn set_payment_type(&self, id: &str, payment_type: PaymentType) -> DraftResult<()> {
        self.mutate(id, |m| m.set_payment_type(id, payment_type))
    }

    pub fn set_invoice_discount(&self, id: &str, discount: InvoiceDiscount) -> DraftResult<()> {
        self.mutate(id, |m| m.set_invoice_discount(id, discount))
    }

    // ========== Items ==========

    #[allow(clippy::too_many_arguments)]
    pub fn add_item(
        &self,
        id: &str,
        product: &Product,
        stock: Option<&StockLevel>,
        quantity: i64,
        explicit_unit_price: Option<f64>,
        explicit_wholesale: Option<f64>,
        explicit_retail: Option<f64>,
    ) -> DraftResult<()> {
        self.mutate(id, |m| {
            m.add_item(
                id,
                product,
                stock,
                quantity,
                explicit_unit_price,
                explicit_wholesale,
                explicit_retail,
            )
        })
    }

    pub fn update_quantity(&self, id: &str, index: usize, quantity: i64) -> DraftResult<()> {
        self.mutate(id, |m| m.update_quantity(id, index, quantity))
    }

    pub fn update_item(&self, id: &str, index: usize, update: &ItemUpdate) -> DraftResult<()> {
        self.mutate(id, |m| m.update_item(id, index, update))
    }

    pub fn update_subtotal(&self, id: &str, index: usize, subtotal: f64) -> DraftResult<()> {
        self.mutate(id, |m| m.update_subtotal(id, index, subtotal))
    }

    pub fn remove_item(&self, id: &str, index: usize) -> DraftResult<()> {
        self.mutate(id, |m| m.remove_item(id, index))
    }

    // ========== Settings ==========

    pub fn set_price_settings(&self, settings: PriceSettings) {
        self.manager.write().set_price_settings(settings);
    }

    pub fn set_policy(&self, policy: shared::BranchPricingPolicy) {
        self.manager.write().set_policy(policy);
    }

    // ========== Live Price Fill ==========

    /// Push live prices into lines whose unit price is exactly 0 (the
    /// first-load placeholder). A nonzero price, manual or previously
    /// set, is never overwritten and nothing is latched.
    pub fn fill_zero_prices(&self, catalog: &CatalogService) {
        let touched = {
            let mut manager = self.manager.write();
            let touched = manager.fill_zero_prices(|product_id| catalog.live_base_price(product_id));
            if !touched.is_empty() {
                self.persist(&manager);
            }
            touched
        };
        for id in touched {
            self.emit(DraftEvent::TabMutated { id });
        }
    }

    // ========== Save Lifecycle ==========

    /// Flag the session as saving and return a snapshot of it for
    /// payload building. Fails if a save is already in flight.
    pub fn begin_save(&self, id: &str) -> DraftResult<DraftSession> {
        let mut manager = self.manager.write();
        manager.begin_save(id)?;
        Ok(manager.session(id)?.clone())
    }

    /// End the in-flight save. On success the session's mutable fields
    /// reset (identity preserved); on failure state is left untouched
    /// for retry.
    pub fn finish_save(&self, id: &str, success: bool) -> DraftResult<()> {
        {
            let mut manager = self.manager.write();
            manager.end_save(id)?;
            if success {
                manager.reset_session(id)?;
                self.persist(&manager);
            }
        }
        if success {
            self.emit(DraftEvent::Committed { id: id.to_string() });
        }
        Ok(())
    }

    // ========== Internals ==========

    fn mutate(
        &self,
        id: &str,
        op: impl FnOnce(&mut DraftSessionManager) -> DraftResult<()>,
    ) -> DraftResult<()> {
        {
            let mut manager = self.manager.write();
            op(&mut manager)?;
            self.persist(&manager);
        }
        self.emit(DraftEvent::TabMutated { id: id.to_string() });
        Ok(())
    }

    /// Save-on-mutate hook. Fire-and-forget: failures are logged, never
    /// raised; the in-memory session keeps operating.
    fn persist(&self, manager: &DraftSessionManager) {
        let (tabs, active_id) = manager.to_persisted();
        if let Err(e) = self.storage.store_tabs(&self.branch_id, &tabs) {
            tracing::error!(branch_id = %self.branch_id, error = %e, "Failed to persist draft tabs");
        }
        if let Err(e) = self.storage.store_active_id(&self.branch_id, &active_id) {
            tracing::error!(branch_id = %self.branch_id, error = %e, "Failed to persist active tab id");
        }
    }

    fn emit(&self, event: DraftEvent) {
        // No receivers is fine; events are best-effort notifications
        let _ = self.event_tx.send(event);
    }
}
