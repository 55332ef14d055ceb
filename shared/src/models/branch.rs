//! Branch pricing policy

use serde::{Deserialize, Serialize};

/// Per-branch pricing policy, read-only input to price derivation.
///
/// Tier percentages are fractions of the base price: `0.15` means the
/// derived price is `base * 1.15`. A missing percentage is treated as 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BranchPricingPolicy {
    pub wholesale_enabled: bool,
    pub retail_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price_percentage: Option<f64>,
    /// Round derived wholesale prices to whole units
    pub round_wholesale_prices: bool,
    /// Round derived retail prices to whole units
    pub round_retail_prices: bool,
}
