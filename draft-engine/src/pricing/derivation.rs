//! Wholesale/retail price derivation
//!
//! Pure function computing the derived price tiers from a base price and
//! the branch pricing policy. A tier is computed only if the branch
//! enables it AND the matching auto-calc setting is on. Deterministic, no
//! side effects; callers decide which fields the results may overwrite.

use shared::{BranchPricingPolicy, PriceSettings};

use super::{round2, round_unit, to_decimal, to_f64};

/// Derived price tiers. `None` means the tier is disabled or auto-calc is
/// off for it; the caller must leave the corresponding field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedPrices {
    pub wholesale: Option<f64>,
    pub retail: Option<f64>,
}

/// Compute wholesale/retail prices from a base price.
pub fn derive_prices(
    base_price: f64,
    policy: &BranchPricingPolicy,
    settings: &PriceSettings,
) -> DerivedPrices {
    DerivedPrices {
        wholesale: derive_tier(
            base_price,
            policy.wholesale_enabled && settings.auto_calc_wholesale,
            policy.wholesale_price_percentage,
            settings.round_wholesale || policy.round_wholesale_prices,
        ),
        retail: derive_tier(
            base_price,
            policy.retail_enabled && settings.auto_calc_retail,
            policy.retail_price_percentage,
            settings.round_retail || policy.round_retail_prices,
        ),
    }
}

fn derive_tier(
    base_price: f64,
    enabled: bool,
    percentage: Option<f64>,
    round_to_unit: bool,
) -> Option<f64> {
    if !enabled {
        return None;
    }
    let pct = to_decimal(percentage.unwrap_or(0.0));
    let raw = to_f64(to_decimal(base_price) * (rust_decimal::Decimal::ONE + pct));
    Some(if round_to_unit {
        round_unit(raw)
    } else {
        round2(raw)
    })
}
