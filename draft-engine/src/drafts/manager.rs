//! Draft session manager
//!
//! Pure in-memory state machine over the set of draft tabs: add / close /
//! activate, per-session field mutation, and item edits built on the
//! line math and price derivation. No I/O here; the [`DraftStore`]
//! wraps this with persistence and change notification.
//!
//! Mutators take an explicit session id. The manager still tracks which
//! tab is active (`active_id`) so callers that mean "the current tab"
//! pass `manager.active_id()` instead of relying on hidden state.
//!
//! [`DraftStore`]: super::store::DraftStore

use chrono::NaiveDate;
use shared::{
    BranchPricingPolicy, DiscountKind, DraftSession, InvoiceDiscount, LineItem, PaymentType,
    PersistedTab, PriceSettings, PriceSource, Product, StockLevel,
};

use super::error::{DraftError, DraftResult};
use crate::pricing::derivation::derive_prices;
use crate::pricing::line_math::{self, TabTotals};
use crate::pricing::round2;

/// A full line-item edit, as submitted from the item edit form.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub quantity: f64,
    pub unit_price: f64,
    pub discount_percent: Option<f64>,
    pub wholesale_price: Option<f64>,
    pub retail_price: Option<f64>,
    pub credit_price: Option<f64>,
    /// Force-recompute wholesale/retail from the new unit price
    pub recalculate: bool,
}

/// CRUD over the set of draft sessions plus per-session mutation.
#[derive(Debug)]
pub struct DraftSessionManager {
    sessions: Vec<DraftSession>,
    active_id: String,
    policy: BranchPricingPolicy,
    settings: PriceSettings,
}

impl DraftSessionManager {
    /// Start with a single seed session; at least one session always
    /// exists.
    pub fn new(policy: BranchPricingPolicy, settings: PriceSettings) -> Self {
        let seed = DraftSession::new(today());
        let active_id = seed.id.clone();
        Self {
            sessions: vec![seed],
            active_id,
            policy,
            settings,
        }
    }

    // ========== Accessors ==========

    pub fn sessions(&self) -> &[DraftSession] {
        &self.sessions
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &DraftSession {
        // The one-tab floor guarantees active_id refers to a live session
        self.sessions
            .iter()
            .find(|s| s.id == self.active_id)
            .unwrap_or(&self.sessions[0])
    }

    pub fn session(&self, id: &str) -> DraftResult<&DraftSession> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| DraftError::SessionNotFound(id.to_string()))
    }

    fn session_mut(&mut self, id: &str) -> DraftResult<&mut DraftSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DraftError::SessionNotFound(id.to_string()))
    }

    fn item_mut(&mut self, id: &str, index: usize) -> DraftResult<&mut LineItem> {
        self.session_mut(id)?
            .items
            .get_mut(index)
            .ok_or(DraftError::ItemNotFound(index))
    }

    /// The session re-hydrated from the given committed receipt, if any.
    pub fn find_by_source(&self, receipt_id: &str) -> Option<String> {
        self.sessions
            .iter()
            .find(|s| s.has_source(receipt_id))
            .map(|s| s.id.clone())
    }

    pub fn settings(&self) -> &PriceSettings {
        &self.settings
    }

    pub fn set_price_settings(&mut self, settings: PriceSettings) {
        self.settings = settings;
    }

    pub fn set_policy(&mut self, policy: BranchPricingPolicy) {
        self.policy = policy;
    }

    // ========== Tab Lifecycle ==========

    /// Open a new empty session (cash, dated today) and make it active.
    pub fn add_tab(&mut self) -> String {
        let session = DraftSession::new(today());
        let id = session.id.clone();
        self.sessions.push(session);
        self.active_id = id.clone();
        id
    }

    /// Close a session. Closing the only remaining session is a no-op;
    /// closing the active one activates the first remaining session.
    pub fn close_tab(&mut self, id: &str) {
        if self.sessions.len() <= 1 {
            return;
        }
        let Some(pos) = self.sessions.iter().position(|s| s.id == id) else {
            return;
        };
        self.sessions.remove(pos);
        if self.active_id == id {
            self.active_id = self.sessions[0].id.clone();
        }
    }

    pub fn set_active_tab(&mut self, id: &str) -> DraftResult<()> {
        self.session(id)?;
        self.active_id = id.to_string();
        Ok(())
    }

    /// Append an externally built session (import) and activate it.
    pub fn append_session(&mut self, session: DraftSession) {
        self.active_id = session.id.clone();
        self.sessions.push(session);
    }

    // ========== Session Fields ==========

    pub fn set_supplier(&mut self, id: &str, supplier_id: Option<String>) -> DraftResult<()> {
        self.session_mut(id)?.supplier_id = supplier_id;
        Ok(())
    }

    pub fn set_date(&mut self, id: &str, date: NaiveDate) -> DraftResult<()> {
        self.session_mut(id)?.receive_date = Some(date);
        Ok(())
    }

    pub fn set_payment_type(&mut self, id: &str, payment_type: PaymentType) -> DraftResult<()> {
        self.session_mut(id)?.payment_type = payment_type;
        Ok(())
    }

    /// Set the invoice-level discount. Percentage values clamp to
    /// [0, 100] so the total can never go negative; fixed values clamp
    /// to zero or more (the total clamps against the subtotal later).
    pub fn set_invoice_discount(&mut self, id: &str, discount: InvoiceDiscount) -> DraftResult<()> {
        let session = self.session_mut(id)?;
        let value = match discount.kind {
            DiscountKind::Percentage => discount.value.clamp(0.0, 100.0),
            _ => discount.value.max(0.0),
        };
        session.discount = InvoiceDiscount {
            kind: discount.kind,
            value,
        };
        Ok(())
    }

    // ========== Items ==========

    /// Add a product line.
    ///
    /// Effective unit price: explicit value, else the stock snapshot's
    /// live base price, else the product's static base price, else 0.
    /// Wholesale/retail derive from that price unless supplied
    /// explicitly; explicitly supplied fields latch `Pinned`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_item(
        &mut self,
        id: &str,
        product: &Product,
        stock: Option<&StockLevel>,
        quantity: i64,
        explicit_unit_price: Option<f64>,
        explicit_wholesale: Option<f64>,
        explicit_retail: Option<f64>,
    ) -> DraftResult<()> {
        let base_price = explicit_unit_price
            .or_else(|| stock.and_then(|s| s.price))
            .or(product.price)
            .unwrap_or(0.0);

        let mut item = LineItem::new(&product.id, &product.name, quantity.max(0), round2(base_price));
        let derived = derive_prices(item.unit_price, &self.policy, &self.settings);

        item.wholesale_price = explicit_wholesale.map(round2).or(derived.wholesale);
        item.retail_price = explicit_retail.map(round2).or(derived.retail);
        if explicit_unit_price.is_some() {
            item.price_source = PriceSource::Pinned;
        }
        if explicit_wholesale.is_some() {
            item.wholesale_source = PriceSource::Pinned;
        }
        if explicit_retail.is_some() {
            item.retail_source = PriceSource::Pinned;
        }
        line_math::refresh_subtotal(&mut item);

        self.session_mut(id)?.items.push(item);
        Ok(())
    }

    /// Quantity-only edit; ignored when the new quantity is not positive.
    pub fn update_quantity(&mut self, id: &str, index: usize, quantity: i64) -> DraftResult<()> {
        if quantity <= 0 {
            return Ok(());
        }
        let item = self.item_mut(id, index)?;
        line_math::set_quantity(item, quantity);
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str, index: usize) -> DraftResult<()> {
        let session = self.session_mut(id)?;
        if index >= session.items.len() {
            return Err(DraftError::ItemNotFound(index));
        }
        session.items.remove(index);
        Ok(())
    }

    /// Full line edit. Always latches the item's unit price `Pinned`:
    /// any full edit is treated as overriding the base price, so the
    /// live-price fill never touches this line again.
    pub fn update_item(&mut self, id: &str, index: usize, update: &ItemUpdate) -> DraftResult<()> {
        let quantity = validate_quantity(update.quantity)?;
        let unit_price = validate_unit_price(update.unit_price)?;

        let policy = self.policy.clone();
        let settings = self.settings;
        let item = self.item_mut(id, index)?;

        if (unit_price - item.unit_price).abs() > f64::EPSILON {
            line_math::set_unit_price(item, unit_price, &policy, &settings);
        }
        line_math::set_quantity(item, quantity);
        if let Some(discount) = update.discount_percent {
            line_math::set_discount(item, discount);
        }

        if let Some(wholesale) = update.wholesale_price {
            item.wholesale_price = Some(round2(wholesale));
            item.wholesale_source = PriceSource::Pinned;
        }
        if let Some(retail) = update.retail_price {
            item.retail_price = Some(round2(retail));
            item.retail_source = PriceSource::Pinned;
        }
        if let Some(credit) = update.credit_price {
            item.credit_price = Some(round2(credit));
            item.credit_source = PriceSource::Pinned;
        }

        if update.recalculate {
            line_math::recalculate_tiers(item, &policy, &settings);
        }

        item.price_source = PriceSource::Pinned;
        line_math::refresh_subtotal(item);
        Ok(())
    }

    /// Subtotal edit: pins the value and reverse-solves the unit price.
    pub fn update_subtotal(&mut self, id: &str, index: usize, subtotal: f64) -> DraftResult<()> {
        let item = self.item_mut(id, index)?;
        line_math::set_subtotal(item, subtotal);
        Ok(())
    }

    pub fn totals(&self, id: &str) -> DraftResult<TabTotals> {
        let session = self.session(id)?;
        Ok(line_math::tab_totals(&session.items, &session.discount))
    }

    /// Push live prices into items whose unit price is exactly 0 (the
    /// first-load placeholder fill). Nonzero prices are never
    /// overwritten and nothing is latched. Returns the ids of sessions
    /// that changed.
    pub fn fill_zero_prices(
        &mut self,
        mut live_price: impl FnMut(&str) -> Option<f64>,
    ) -> Vec<String> {
        let policy = self.policy.clone();
        let settings = self.settings;
        let mut touched = Vec::new();
        for session in &mut self.sessions {
            let mut changed = false;
            for item in &mut session.items {
                if item.unit_price != 0.0 {
                    continue;
                }
                let Some(live) = live_price(&item.product_id) else {
                    continue;
                };
                if live == 0.0 {
                    continue;
                }
                line_math::set_unit_price(item, live, &policy, &settings);
                changed = true;
            }
            if changed {
                touched.push(session.id.clone());
            }
        }
        touched
    }

    // ========== Save Lifecycle ==========

    pub fn begin_save(&mut self, id: &str) -> DraftResult<()> {
        let session = self.session_mut(id)?;
        if session.is_saving {
            return Err(DraftError::SaveInFlight);
        }
        session.is_saving = true;
        Ok(())
    }

    pub fn end_save(&mut self, id: &str) -> DraftResult<()> {
        self.session_mut(id)?.is_saving = false;
        Ok(())
    }

    /// Clear the session's mutable fields after a successful commit,
    /// preserving its identity and tab slot.
    pub fn reset_session(&mut self, id: &str) -> DraftResult<()> {
        self.session_mut(id)?.reset(today());
        Ok(())
    }

    // ========== Hydration ==========

    /// Replace state with hydrated sessions. An empty list keeps the
    /// default seed session; a stored active id that no longer resolves
    /// falls back to the first session.
    pub fn hydrate(&mut self, sessions: Vec<DraftSession>, active_id: Option<String>) {
        if sessions.is_empty() {
            return;
        }
        self.sessions = sessions;
        self.active_id = active_id
            .filter(|id| self.sessions.iter().any(|s| &s.id == id))
            .unwrap_or_else(|| self.sessions[0].id.clone());
    }

    /// Persisted form of all tabs plus the active id.
    pub fn to_persisted(&self) -> (Vec<PersistedTab>, String) {
        (
            self.sessions.iter().map(PersistedTab::from).collect(),
            self.active_id.clone(),
        )
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn validate_quantity(quantity: f64) -> DraftResult<i64> {
    if !quantity.is_finite() {
        return Err(DraftError::InvalidQuantity);
    }
    let rounded = quantity.round() as i64;
    if rounded <= 0 {
        return Err(DraftError::InvalidQuantity);
    }
    Ok(rounded)
}

fn validate_unit_price(unit_price: f64) -> DraftResult<f64> {
    if !unit_price.is_finite() || unit_price < 0.0 {
        return Err(DraftError::InvalidUnitPrice);
    }
    Ok(unit_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BranchPricingPolicy {
        BranchPricingPolicy {
            wholesale_enabled: true,
            retail_enabled: true,
            wholesale_price_percentage: Some(0.10),
            retail_price_percentage: Some(0.20),
            ..Default::default()
        }
    }

    fn manager() -> DraftSessionManager {
        DraftSessionManager::new(policy(), PriceSettings::default())
    }

    fn product(id: &str, price: Option<f64>) -> Product {
        Product::new(id, format!("Product {id}"), price)
    }

    fn stock(product_id: &str, price: Option<f64>) -> StockLevel {
        StockLevel {
            product_id: product_id.to_string(),
            current_stock: 50,
            price,
            wholesale_price: None,
            retail_price: None,
        }
    }

    // ---- Tab lifecycle ----

    #[test]
    fn starts_with_one_active_session() {
        let m = manager();
        assert_eq!(m.sessions().len(), 1);
        assert_eq!(m.active_id(), m.sessions()[0].id);
    }

    #[test]
    fn add_tab_becomes_active() {
        let mut m = manager();
        let id = m.add_tab();
        assert_eq!(m.sessions().len(), 2);
        assert_eq!(m.active_id(), id);
    }

    #[test]
    fn closing_last_session_is_a_no_op() {
        let mut m = manager();
        let only = m.sessions()[0].id.clone();
        m.close_tab(&only);
        assert_eq!(m.sessions().len(), 1);
        assert_eq!(m.active_id(), only);
    }

    #[test]
    fn closing_active_tab_activates_first_remaining() {
        let mut m = manager();
        let first = m.sessions()[0].id.clone();
        let second = m.add_tab();
        assert_eq!(m.active_id(), second);

        m.close_tab(&second);
        assert_eq!(m.sessions().len(), 1);
        assert_eq!(m.active_id(), first);
    }

    #[test]
    fn closing_inactive_tab_keeps_active() {
        let mut m = manager();
        let first = m.sessions()[0].id.clone();
        let second = m.add_tab();

        m.close_tab(&first);
        assert_eq!(m.active_id(), second);
    }

    #[test]
    fn set_active_tab_rejects_unknown_id() {
        let mut m = manager();
        assert!(matches!(
            m.set_active_tab("nope"),
            Err(DraftError::SessionNotFound(_))
        ));
    }

    // ---- add_item price fallback chain ----

    #[test]
    fn add_item_prefers_explicit_price() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(5.0)), Some(&stock("p1", Some(6.0))), 2, Some(7.0), None, None)
            .unwrap();
        let item = &m.active().items[0];
        assert_eq!(item.unit_price, 7.0);
        assert!(item.price_source.is_pinned());
    }

    #[test]
    fn add_item_falls_back_to_live_then_static_then_zero() {
        let mut m = manager();
        let id = m.active_id().to_string();

        m.add_item(&id, &product("p1", Some(5.0)), Some(&stock("p1", Some(6.0))), 1, None, None, None)
            .unwrap();
        assert_eq!(m.active().items[0].unit_price, 6.0);

        m.add_item(&id, &product("p2", Some(5.0)), None, 1, None, None, None)
            .unwrap();
        assert_eq!(m.active().items[1].unit_price, 5.0);

        m.add_item(&id, &product("p3", None), None, 1, None, None, None)
            .unwrap();
        assert_eq!(m.active().items[2].unit_price, 0.0);
        assert!(!m.active().items[2].price_source.is_pinned());
    }

    #[test]
    fn add_item_derives_unsupplied_tiers_only() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 1, None, Some(15.0), None)
            .unwrap();
        let item = &m.active().items[0];
        assert_eq!(item.wholesale_price, Some(15.0));
        assert!(item.wholesale_source.is_pinned());
        assert_eq!(item.retail_price, Some(12.0)); // derived: 10 * 1.2
        assert!(!item.retail_source.is_pinned());
        assert_eq!(item.subtotal, 10.0);
    }

    // ---- Item edits ----

    #[test]
    fn update_quantity_ignores_non_positive() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 2, None, None, None)
            .unwrap();

        m.update_quantity(&id, 0, 0).unwrap();
        assert_eq!(m.active().items[0].quantity, 2);
        m.update_quantity(&id, 0, -3).unwrap();
        assert_eq!(m.active().items[0].quantity, 2);
        m.update_quantity(&id, 0, 5).unwrap();
        assert_eq!(m.active().items[0].quantity, 5);
        assert_eq!(m.active().items[0].subtotal, 50.0);
    }

    #[test]
    fn update_item_rejects_bad_quantity_and_price() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 2, None, None, None)
            .unwrap();

        let bad_qty = ItemUpdate {
            quantity: 0.0,
            unit_price: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            m.update_item(&id, 0, &bad_qty),
            Err(DraftError::InvalidQuantity)
        ));

        let bad_price = ItemUpdate {
            quantity: 2.0,
            unit_price: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            m.update_item(&id, 0, &bad_price),
            Err(DraftError::InvalidUnitPrice)
        ));

        // Rejected edits leave state untouched
        assert_eq!(m.active().items[0].quantity, 2);
        assert_eq!(m.active().items[0].unit_price, 10.0);
    }

    #[test]
    fn update_item_always_pins_price() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 2, None, None, None)
            .unwrap();
        assert!(!m.active().items[0].price_source.is_pinned());

        // Only the discount changes, price still latches
        let update = ItemUpdate {
            quantity: 2.0,
            unit_price: 10.0,
            discount_percent: Some(5.0),
            ..Default::default()
        };
        m.update_item(&id, 0, &update).unwrap();
        assert!(m.active().items[0].price_source.is_pinned());
    }

    #[test]
    fn manual_wholesale_survives_later_price_edits() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 1, None, None, None)
            .unwrap();

        let pin = ItemUpdate {
            quantity: 1.0,
            unit_price: 10.0,
            wholesale_price: Some(42.0),
            ..Default::default()
        };
        m.update_item(&id, 0, &pin).unwrap();

        let reprice = ItemUpdate {
            quantity: 1.0,
            unit_price: 30.0,
            ..Default::default()
        };
        m.update_item(&id, 0, &reprice).unwrap();

        let item = &m.active().items[0];
        assert_eq!(item.wholesale_price, Some(42.0));
        assert_eq!(item.retail_price, Some(36.0)); // auto retier: 30 * 1.2
    }

    #[test]
    fn recalculate_escape_hatch_overrides_pinned_tier() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 1, None, Some(42.0), None)
            .unwrap();

        let update = ItemUpdate {
            quantity: 1.0,
            unit_price: 20.0,
            recalculate: true,
            ..Default::default()
        };
        m.update_item(&id, 0, &update).unwrap();

        let item = &m.active().items[0];
        assert_eq!(item.wholesale_price, Some(22.0)); // 20 * 1.1
        assert!(item.wholesale_source.is_pinned()); // latch stays
    }

    #[test]
    fn remove_item_out_of_range_errors() {
        let mut m = manager();
        let id = m.active_id().to_string();
        assert!(matches!(
            m.remove_item(&id, 0),
            Err(DraftError::ItemNotFound(0))
        ));
    }

    // ---- Totals ----

    #[test]
    fn totals_apply_invoice_discount() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 2, None, None, None)
            .unwrap();
        m.set_invoice_discount(&id, InvoiceDiscount::percentage(10.0))
            .unwrap();

        let totals = m.totals(&id).unwrap();
        assert_eq!(totals.subtotal, 20.0);
        assert_eq!(totals.discount_amount, 2.0);
        assert_eq!(totals.total, 18.0);
    }

    #[test]
    fn negative_invoice_discount_is_clamped() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.set_invoice_discount(
            &id,
            InvoiceDiscount {
                kind: DiscountKind::Fixed,
                value: -10.0,
            },
        )
        .unwrap();
        assert_eq!(m.active().discount.value, 0.0);
    }

    #[test]
    fn percentage_discount_above_100_clamps_and_total_stays_non_negative() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", Some(10.0)), None, 2, None, None, None)
            .unwrap();
        m.set_invoice_discount(&id, InvoiceDiscount::percentage(150.0))
            .unwrap();

        assert_eq!(m.active().discount.value, 100.0);
        let totals = m.totals(&id).unwrap();
        assert_eq!(totals.discount_amount, 20.0);
        assert_eq!(totals.total, 0.0);
    }

    // ---- Hydration ----

    #[test]
    fn hydrate_empty_keeps_seed() {
        let mut m = manager();
        let seed = m.active_id().to_string();
        m.hydrate(Vec::new(), None);
        assert_eq!(m.sessions().len(), 1);
        assert_eq!(m.active_id(), seed);
    }

    #[test]
    fn hydrate_restores_active_or_falls_back() {
        let mut m = manager();
        let today = chrono::Local::now().date_naive();
        let a = DraftSession::new(today);
        let b = DraftSession::new(today);
        let b_id = b.id.clone();

        m.hydrate(vec![a.clone(), b], Some(b_id.clone()));
        assert_eq!(m.active_id(), b_id);

        m.hydrate(vec![a.clone()], Some("stale".to_string()));
        assert_eq!(m.active_id(), a.id);
    }

    // ---- Live price fill ----

    #[test]
    fn fill_zero_prices_only_touches_placeholder_lines() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.add_item(&id, &product("p1", None), None, 2, None, None, None)
            .unwrap();
        m.add_item(&id, &product("p2", Some(4.0)), None, 1, None, None, None)
            .unwrap();

        let touched = m.fill_zero_prices(|pid| (pid == "p1").then_some(3.5));
        assert_eq!(touched, vec![id.clone()]);
        assert_eq!(m.active().items[0].unit_price, 3.5);
        assert_eq!(m.active().items[0].subtotal, 7.0);
        assert_eq!(m.active().items[1].unit_price, 4.0); // untouched

        // Second pass finds nothing to fill
        assert!(m.fill_zero_prices(|_| Some(9.9)).is_empty());
    }

    // ---- Save lifecycle ----

    #[test]
    fn begin_save_twice_is_rejected() {
        let mut m = manager();
        let id = m.active_id().to_string();
        m.begin_save(&id).unwrap();
        assert!(matches!(m.begin_save(&id), Err(DraftError::SaveInFlight)));
        m.end_save(&id).unwrap();
        m.begin_save(&id).unwrap();
    }
}
