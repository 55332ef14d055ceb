//! Line-item reverse-solve algebra
//!
//! Keeps `{quantity, unit_price, discount_percent, subtotal}` mutually
//! consistent under arbitrary edit order. An explicitly entered subtotal
//! is "pinned" (`pinned_subtotal`) and reverse-solves the unit price;
//! edits to unit price or discount un-pin it so the subtotal re-derives.
//!
//! # Edit rules
//!
//! | Edit       | Effect |
//! |------------|--------|
//! | quantity   | pinned & qty>0 → `unit_price = pinned / qty`; else subtotal re-derives |
//! | unit price | un-pins subtotal; re-derives Auto wholesale/retail tiers |
//! | discount   | clamps to [0,100]; un-pins subtotal |
//! | subtotal   | pins value; reverse-solves `unit_price = s / (qty * (1 - d/100))` |

use rust_decimal::Decimal;
use shared::{BranchPricingPolicy, DiscountKind, InvoiceDiscount, LineItem, PriceSettings};

use super::derivation::derive_prices;
use super::{round2, to_decimal, to_f64};

/// Aggregated totals for one draft tab.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TabTotals {
    /// Sum of per-item discounted line amounts, 2dp
    pub subtotal: f64,
    /// Invoice-level discount amount, never exceeds the subtotal
    pub discount_amount: f64,
    /// `subtotal - discount_amount`
    pub total: f64,
}

/// Discounted line amount: `round2(qty * price * (1 - discount/100))`.
pub fn line_total(quantity: i64, unit_price: f64, discount_percent: f64) -> f64 {
    to_f64(raw_line_total(quantity, unit_price, discount_percent))
}

fn raw_line_total(quantity: i64, unit_price: f64, discount_percent: f64) -> Decimal {
    let multiplier = Decimal::ONE - to_decimal(discount_percent) / Decimal::ONE_HUNDRED;
    Decimal::from(quantity) * to_decimal(unit_price) * multiplier
}

/// Re-derive the displayed subtotal. A pinned subtotal wins; otherwise
/// the discounted line amount is computed fresh.
pub fn refresh_subtotal(item: &mut LineItem) {
    item.subtotal = match item.pinned_subtotal {
        Some(pinned) => round2(pinned),
        None => line_total(item.quantity, item.unit_price, item.discount_percent),
    };
}

/// Apply a quantity edit.
///
/// With a pinned subtotal and a positive quantity the unit price is
/// recomputed so the pinned subtotal holds; otherwise the unit price is
/// left alone and the subtotal re-derives.
pub fn set_quantity(item: &mut LineItem, quantity: i64) {
    item.quantity = quantity.max(0);
    if let Some(pinned) = item.pinned_subtotal {
        if item.quantity > 0 {
            item.unit_price = to_f64(to_decimal(pinned) / Decimal::from(item.quantity));
        }
    }
    refresh_subtotal(item);
}

/// Apply a unit-price edit.
///
/// Un-pins the subtotal and re-runs price derivation, writing results
/// only into tier fields whose latch is still `Auto`.
pub fn set_unit_price(
    item: &mut LineItem,
    unit_price: f64,
    policy: &BranchPricingPolicy,
    settings: &PriceSettings,
) {
    item.unit_price = round2(unit_price);
    item.pinned_subtotal = None;

    let derived = derive_prices(item.unit_price, policy, settings);
    if !item.wholesale_source.is_pinned() {
        if let Some(wholesale) = derived.wholesale {
            item.wholesale_price = Some(wholesale);
        }
    }
    if !item.retail_source.is_pinned() {
        if let Some(retail) = derived.retail {
            item.retail_price = Some(retail);
        }
    }
    refresh_subtotal(item);
}

/// Apply a discount edit. Clamped to [0, 100]; un-pins the subtotal.
pub fn set_discount(item: &mut LineItem, discount_percent: f64) {
    item.discount_percent = discount_percent.clamp(0.0, 100.0);
    item.pinned_subtotal = None;
    refresh_subtotal(item);
}

/// Apply a subtotal edit, pinning the value and reverse-solving the unit
/// price.
///
/// With a positive quantity and a positive discount multiplier:
/// `unit_price = subtotal / (qty * (1 - d/100))`. A multiplier of zero or
/// below falls back to dividing by quantity alone. A zero quantity writes
/// the subtotal straight into the unit price (implicit quantity of 1).
pub fn set_subtotal(item: &mut LineItem, subtotal: f64) {
    let pinned = round2(subtotal);
    item.pinned_subtotal = Some(pinned);

    if item.quantity > 0 {
        let qty = Decimal::from(item.quantity);
        let multiplier = Decimal::ONE - to_decimal(item.discount_percent) / Decimal::ONE_HUNDRED;
        item.unit_price = if multiplier > Decimal::ZERO {
            to_f64(to_decimal(pinned) / (qty * multiplier))
        } else {
            to_f64(to_decimal(pinned) / qty)
        };
    } else {
        item.unit_price = pinned;
    }
    refresh_subtotal(item);
}

/// Force-recompute wholesale/retail from the current unit price.
///
/// The "Recalculate" escape hatch: overwrites even pinned tier values but
/// leaves the latches untouched.
pub fn recalculate_tiers(
    item: &mut LineItem,
    policy: &BranchPricingPolicy,
    settings: &PriceSettings,
) {
    let derived = derive_prices(item.unit_price, policy, settings);
    if let Some(wholesale) = derived.wholesale {
        item.wholesale_price = Some(wholesale);
    }
    if let Some(retail) = derived.retail {
        item.retail_price = Some(retail);
    }
}

/// Aggregate a tab's items and apply the invoice-level discount.
///
/// A fixed discount never exceeds the subtotal.
pub fn tab_totals(items: &[LineItem], discount: &InvoiceDiscount) -> TabTotals {
    let sum: Decimal = items
        .iter()
        .map(|item| raw_line_total(item.quantity, item.unit_price, item.discount_percent))
        .sum();
    let subtotal = to_f64(sum);

    let discount_amount = match discount.kind {
        DiscountKind::None => 0.0,
        DiscountKind::Percentage => {
            to_f64(to_decimal(subtotal) * to_decimal(discount.value) / Decimal::ONE_HUNDRED)
        }
        DiscountKind::Fixed => round2(discount.value).min(subtotal),
    };

    TabTotals {
        subtotal,
        discount_amount,
        total: to_f64(to_decimal(subtotal) - to_decimal(discount_amount)),
    }
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

    fn item(quantity: i64, unit_price: f64) -> LineItem {
        let mut item = LineItem::new("p1", "Cola", quantity, unit_price);
        refresh_subtotal(&mut item);
        item
    }

    #[test]
    fn subtotal_derives_from_quantity_price_discount() {
        let mut it = item(3, 10.0);
        set_discount(&mut it, 10.0);
        assert_eq!(it.subtotal, 27.0);
    }

    #[test]
    fn reverse_solve_subtotal_to_unit_price() {
        // quantity=3, unitPrice=10, discount=0; subtotal 24 → unitPrice 8.00
        let mut it = item(3, 10.0);
        set_subtotal(&mut it, 24.0);
        assert_eq!(it.unit_price, 8.0);
        assert_eq!(it.subtotal, 24.0);
        assert_eq!(it.pinned_subtotal, Some(24.0));
    }

    #[test]
    fn reverse_solve_accounts_for_discount() {
        let mut it = item(2, 10.0);
        set_discount(&mut it, 50.0);
        set_subtotal(&mut it, 10.0);
        // 10 / (2 * 0.5) = 10.00
        assert_eq!(it.unit_price, 10.0);
    }

    #[test]
    fn full_discount_falls_back_to_quantity_division() {
        let mut it = item(4, 10.0);
        set_discount(&mut it, 100.0);
        set_subtotal(&mut it, 20.0);
        // multiplier is 0 → 20 / 4
        assert_eq!(it.unit_price, 5.0);
        assert_eq!(it.subtotal, 20.0);
    }

    #[test]
    fn zero_quantity_subtotal_sets_unit_price_directly() {
        let mut it = item(0, 0.0);
        set_subtotal(&mut it, 15.5);
        assert_eq!(it.unit_price, 15.5);
    }

    #[test]
    fn quantity_edit_with_pinned_subtotal_resolves_unit_price() {
        let mut it = item(3, 10.0);
        set_subtotal(&mut it, 24.0);
        set_quantity(&mut it, 4);
        assert_eq!(it.unit_price, 6.0);
        assert_eq!(it.subtotal, 24.0);
    }

    #[test]
    fn quantity_edit_without_pin_rederives_subtotal() {
        let mut it = item(3, 10.0);
        set_quantity(&mut it, 5);
        assert_eq!(it.unit_price, 10.0);
        assert_eq!(it.subtotal, 50.0);
    }

    #[test]
    fn unit_price_edit_clears_pin() {
        let mut it = item(3, 10.0);
        set_subtotal(&mut it, 24.0);
        set_unit_price(&mut it, 12.0, &policy(), &PriceSettings::default());
        assert_eq!(it.pinned_subtotal, None);
        assert_eq!(it.subtotal, 36.0);
    }

    #[test]
    fn unit_price_edit_rederives_auto_tiers_only() {
        let mut it = item(1, 10.0);
        it.wholesale_price = Some(99.0);
        it.wholesale_source = shared::PriceSource::Pinned;

        set_unit_price(&mut it, 20.0, &policy(), &PriceSettings::default());
        assert_eq!(it.wholesale_price, Some(99.0)); // latched
        assert_eq!(it.retail_price, Some(24.0)); // auto: 20 * 1.2
    }

    #[test]
    fn recalculate_overwrites_pinned_tiers_without_unlatching() {
        let mut it = item(1, 10.0);
        it.wholesale_price = Some(99.0);
        it.wholesale_source = shared::PriceSource::Pinned;

        recalculate_tiers(&mut it, &policy(), &PriceSettings::default());
        assert_eq!(it.wholesale_price, Some(11.0));
        assert!(it.wholesale_source.is_pinned());
    }

    #[test]
    fn discount_clamps_to_valid_range() {
        let mut it = item(1, 10.0);
        set_discount(&mut it, 150.0);
        assert_eq!(it.discount_percent, 100.0);
        set_discount(&mut it, -5.0);
        assert_eq!(it.discount_percent, 0.0);
    }

    #[test]
    fn consistency_holds_over_arbitrary_edit_order() {
        let mut it = item(2, 7.35);
        let policy = policy();
        let settings = PriceSettings::default();

        set_discount(&mut it, 12.5);
        set_quantity(&mut it, 7);
        set_unit_price(&mut it, 3.33, &policy, &settings);
        set_discount(&mut it, 33.0);
        set_quantity(&mut it, 11);

        let expected = line_total(it.quantity, it.unit_price, it.discount_percent);
        assert!((it.subtotal - expected).abs() < 0.01);
    }

    #[test]
    fn tab_totals_percentage_discount() {
        let items = vec![item(2, 10.0), item(1, 5.0)];
        let totals = tab_totals(&items, &InvoiceDiscount::percentage(10.0));
        assert_eq!(totals.subtotal, 25.0);
        assert_eq!(totals.discount_amount, 2.5);
        assert_eq!(totals.total, 22.5);
    }

    #[test]
    fn fixed_discount_clamps_at_subtotal() {
        let items = vec![item(10, 10.0)];
        let totals = tab_totals(&items, &InvoiceDiscount::fixed(150.0));
        assert_eq!(totals.subtotal, 100.0);
        assert_eq!(totals.discount_amount, 100.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn no_discount_passes_subtotal_through() {
        let items = vec![item(3, 4.0)];
        let totals = tab_totals(&items, &InvoiceDiscount::default());
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.total, 12.0);
    }
}
