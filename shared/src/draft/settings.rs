//! Per-branch calculation settings

use serde::{Deserialize, Serialize};

/// User toggles controlling price derivation for the branch.
///
/// Every field carries a serde default so payloads stored before a key
/// existed still deserialize; stored values merge over these defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PriceSettings {
    /// Derive wholesale prices from the unit price automatically
    pub auto_calc_wholesale: bool,
    /// Derive retail prices from the unit price automatically
    pub auto_calc_retail: bool,
    /// Round derived wholesale prices to whole units
    pub round_wholesale: bool,
    /// Round derived retail prices to whole units
    pub round_retail: bool,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            auto_calc_wholesale: true,
            auto_calc_retail: true,
            round_wholesale: false,
            round_retail: false,
        }
    }
}
