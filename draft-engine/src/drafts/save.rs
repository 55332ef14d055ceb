//! Commit coordination
//!
//! Validates a draft, builds the commit payload, dispatches create vs
//! update, and resets the session on success. Failures leave the draft
//! untouched so it can be retried without re-entry.

use shared::{DraftSession, PayloadLine, PaymentType, ReceiveStockPayload};
use std::sync::Arc;

use super::error::{DraftError, DraftResult};
use super::store::DraftStore;
use crate::pricing::line_math;
use crate::services::InventoryApi;

pub struct SaveCoordinator {
    api: Arc<dyn InventoryApi>,
}

impl SaveCoordinator {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self { api }
    }

    /// Commit the session. `total_cost` is the invoice-discounted total
    /// as shown to the user.
    ///
    /// Edit-mode sessions update their source record; everything else
    /// creates a new one. On success the session resets to an empty
    /// draft (identity preserved); on failure state is untouched and
    /// the error carries the rejection reason.
    pub async fn commit(
        &self,
        store: &DraftStore,
        session_id: &str,
        total_cost: f64,
    ) -> DraftResult<()> {
        let receive_date = validate(&store.session(session_id)?)?;

        let session = store.begin_save(session_id)?;
        let payload = build_payload(&session, receive_date, total_cost);

        let result = match session.source_receipt_id.as_deref() {
            Some(record_id) if session.is_edit_mode => {
                self.api.update_inventory(record_id, &payload).await
            }
            _ => self.api.create_receive_stock(&payload).await,
        };

        match result {
            Ok(outcome) if outcome.success => {
                store.finish_save(session_id, true)?;
                Ok(())
            }
            Ok(outcome) => {
                store.finish_save(session_id, false)?;
                Err(DraftError::CommitRejected(
                    outcome.error.unwrap_or_else(|| "commit rejected".to_string()),
                ))
            }
            Err(e) => {
                store.finish_save(session_id, false)?;
                Err(DraftError::CommitRejected(e.to_string()))
            }
        }
    }
}

/// Commit preconditions. Checked before the save flag is taken so a
/// rejected draft is never marked saving. Returns the validated
/// receive date.
fn validate(session: &DraftSession) -> DraftResult<chrono::NaiveDate> {
    if session.payment_type == PaymentType::Credit && session.supplier_id.is_none() {
        return Err(DraftError::SupplierRequired);
    }
    let receive_date = session
        .receive_date
        .ok_or(DraftError::ReceiveDateRequired)?;
    if session.items.iter().any(|item| item.quantity <= 0) {
        return Err(DraftError::InvalidQuantity);
    }
    Ok(receive_date)
}

fn build_payload(
    session: &DraftSession,
    receive_date: chrono::NaiveDate,
    total_cost: f64,
) -> ReceiveStockPayload {
    let items = session
        .items
        .iter()
        .map(|item| PayloadLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount_percent: item.discount_percent,
            wholesale_price: item.wholesale_price,
            retail_price: item.retail_price,
            credit_price: item.credit_price,
            total: line_math::line_total(item.quantity, item.unit_price, item.discount_percent),
        })
        .collect();

    ReceiveStockPayload {
        supplier_id: session.supplier_id.clone(),
        payment_type: session.payment_type,
        receive_date,
        discount: session.discount,
        items,
        total_cost,
    }
}
