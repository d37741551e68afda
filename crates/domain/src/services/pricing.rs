//! Proposal pricing.
//!
//! Base costs come from a placeholder heuristic on the match name rather
//! than from catalog data. Items whose name contains [`PREMIUM_KEYWORD`]
//! (case-sensitive) cost [`PREMIUM_BASE_COST`], everything else costs
//! [`STANDARD_BASE_COST`].

use crate::models::{Match, PricedItem};

/// Name substring that selects the premium base cost.
pub const PREMIUM_KEYWORD: &str = "Pump";

/// Base cost for premium items.
pub const PREMIUM_BASE_COST: f64 = 1000.0;

/// Base cost for all other items.
pub const STANDARD_BASE_COST: f64 = 500.0;

/// Output of a pricing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult {
    pub items: Vec<PricedItem>,
    pub total_value: f64,
}

impl PricingResult {
    /// True when the total and every sell price are finite numbers.
    ///
    /// A finite margin can still overflow `f64` once multiplied out.
    pub fn is_finite(&self) -> bool {
        self.total_value.is_finite() && self.items.iter().all(|i| i.sell_price.is_finite())
    }
}

/// Base cost of a single match.
pub fn base_cost(name: &str) -> f64 {
    if name.contains(PREMIUM_KEYWORD) {
        PREMIUM_BASE_COST
    } else {
        STANDARD_BASE_COST
    }
}

/// Multiplier applied to base cost for the given margin percentage.
pub fn margin_multiplier(margin_percent: f64) -> f64 {
    1.0 + margin_percent / 100.0
}

/// Prices every match at the given margin.
///
/// The total is the summed base cost times the multiplier, not the sum of
/// the per-item sell prices.
pub fn price(matches: &[Match], margin_percent: f64) -> PricingResult {
    let multiplier = margin_multiplier(margin_percent);
    let mut total_base_cost = 0.0;

    let items = matches
        .iter()
        .map(|m| {
            let base_cost = base_cost(&m.name);
            total_base_cost += base_cost;
            PricedItem {
                sku: m.sku.clone(),
                description: m.name.clone(),
                base_cost,
                sell_price: base_cost * multiplier,
            }
        })
        .collect();

    PricingResult {
        items,
        total_value: total_base_cost * multiplier,
    }
}
