//! Receipt re-import
//!
//! Turns a committed receive-stock record back into an editable draft
//! session. Imported prices are authoritative: every price that rode on
//! the receipt is restored pinned so catalog refreshes and tier
//! recalculation never overwrite it.

use shared::{DraftSession, LineItem, PriceSource, ReceiveStockRecord};
use std::sync::Arc;

use super::error::{DraftError, DraftResult};
use super::store::DraftStore;
use crate::pricing::line_math;
use crate::services::{CatalogService, InventoryApi};

pub struct InventoryImporter {
    api: Arc<dyn InventoryApi>,
}

impl InventoryImporter {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self { api }
    }

    /// Import a committed record into a new edit-mode session and
    /// activate it. Importing the same record twice activates the
    /// existing session instead of duplicating it.
    ///
    /// Returns the id of the session now holding the record.
    pub async fn load_inventory(
        &self,
        store: &DraftStore,
        catalog: &CatalogService,
        record_id: &str,
    ) -> DraftResult<String> {
        if let Some(existing) = store.find_by_source(record_id) {
            store.set_active_tab(&existing)?;
            return Ok(existing);
        }

        let record = self
            .api
            .get_inventory_by_id(record_id)
            .await
            .map_err(|e| DraftError::CommitRejected(e.to_string()))?
            .ok_or_else(|| DraftError::RecordNotFound(record_id.to_string()))?;

        let session = build_session(record, catalog);
        let id = session.id.clone();
        store.append_session(session);
        Ok(id)
    }
}

/// Rebuild an edit-mode session from a committed record, resolving line
/// products against the live catalog. Lines whose product no longer
/// exists are dropped with a warning.
fn build_session(record: ReceiveStockRecord, catalog: &CatalogService) -> DraftSession {
    let today = chrono::Local::now().date_naive();
    let mut session = DraftSession::new(today);
    session.supplier_id = record.supplier_id;
    session.payment_type = record.payment_type;
    session.receive_date = Some(record.receive_date);
    session.discount = record.discount;
    session.is_edit_mode = true;
    session.source_receipt_id = Some(record.id.clone());

    for line in record.items {
        let product_id = line.product.id();
        let Some(name) = catalog.product_name(product_id) else {
            tracing::warn!(
                record_id = %record.id,
                product_id = %product_id,
                "Dropping imported line for product missing from catalog"
            );
            continue;
        };

        let mut item = LineItem::new(product_id, name, line.quantity, line.unit_price);
        item.discount_percent = line.discount_percent.clamp(0.0, 100.0);
        item.price_source = PriceSource::Pinned;
        item.wholesale_price = line.wholesale_price;
        item.retail_price = line.retail_price;
        item.credit_price = line.credit_price;
        if item.wholesale_price.is_some() {
            item.wholesale_source = PriceSource::Pinned;
        }
        if item.retail_price.is_some() {
            item.retail_source = PriceSource::Pinned;
        }
        if item.credit_price.is_some() {
            item.credit_source = PriceSource::Pinned;
        }
        line_math::refresh_subtotal(&mut item);
        session.items.push(item);
    }

    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::storage::DraftStorage;
    use crate::services::InMemoryInventoryApi;
    use chrono::NaiveDate;
    use shared::{
        BranchPricingPolicy, InvoiceDiscount, PaymentType, PriceSettings, ProductRef, ReceiptLine,
    };

    fn store() -> DraftStore {
        DraftStore::new(
            DraftStorage::open_in_memory().unwrap(),
            "branch-1",
            BranchPricingPolicy::default(),
            PriceSettings::default(),
        )
    }

    fn catalog() -> CatalogService {
        let catalog = CatalogService::new();
        catalog.refresh_products(vec![
            shared::Product::new("p1", "Cola 330ml", Some(4.0)),
            shared::Product::new("p2", "Chips", Some(2.0)),
        ]);
        catalog
    }

    fn record(id: &str) -> ReceiveStockRecord {
        ReceiveStockRecord {
            id: id.to_string(),
            supplier_id: Some("sup-1".into()),
            payment_type: PaymentType::Credit,
            receive_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            discount: InvoiceDiscount::percentage(5.0),
            items: vec![
                ReceiptLine {
                    product: ProductRef::Id("p1".into()),
                    quantity: 3,
                    unit_price: 4.5,
                    discount_percent: 0.0,
                    wholesale_price: Some(5.5),
                    retail_price: None,
                    credit_price: None,
                    total: 13.5,
                },
                ReceiptLine {
                    product: ProductRef::Id("gone".into()),
                    quantity: 1,
                    unit_price: 9.0,
                    discount_percent: 0.0,
                    wholesale_price: None,
                    retail_price: None,
                    credit_price: None,
                    total: 9.0,
                },
            ],
            total_cost: 21.38,
        }
    }

    #[tokio::test]
    async fn import_builds_pinned_edit_session() {
        let api = Arc::new(InMemoryInventoryApi::new());
        api.insert_record(record("rcpt-1"));
        let importer = InventoryImporter::new(api);
        let store = store();

        let id = importer
            .load_inventory(&store, &catalog(), "rcpt-1")
            .await
            .unwrap();

        assert_eq!(store.active_id(), id);
        let session = store.session(&id).unwrap();
        assert!(session.is_edit_mode);
        assert_eq!(session.source_receipt_id.as_deref(), Some("rcpt-1"));
        assert_eq!(session.payment_type, PaymentType::Credit);

        // Line for the missing product was dropped
        assert_eq!(session.items.len(), 1);
        let item = &session.items[0];
        assert_eq!(item.product_name, "Cola 330ml");
        assert!(item.price_source.is_pinned());
        assert!(item.wholesale_source.is_pinned());
        assert!(!item.retail_source.is_pinned());
        assert_eq!(item.subtotal, 13.5);
    }

    #[tokio::test]
    async fn import_is_idempotent() {
        let api = Arc::new(InMemoryInventoryApi::new());
        api.insert_record(record("rcpt-1"));
        let importer = InventoryImporter::new(api);
        let store = store();
        let catalog = catalog();

        let first = importer
            .load_inventory(&store, &catalog, "rcpt-1")
            .await
            .unwrap();
        store.add_tab();
        let second = importer
            .load_inventory(&store, &catalog, "rcpt-1")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.active_id(), first);
        // Seed tab + imported tab + the extra tab, no duplicate import
        assert_eq!(store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn missing_record_is_an_error() {
        let api = Arc::new(InMemoryInventoryApi::new());
        let importer = InventoryImporter::new(api);
        let store = store();

        let err = importer
            .load_inventory(&store, &catalog(), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::RecordNotFound(_)));
    }
}
