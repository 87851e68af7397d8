//! Calculator configuration.
//!
//! Every tunable lives in an explicit struct handed to the calculator that
//! needs it. Per-tenant overrides are a matter of constructing a different
//! value; tests construct exactly what they assert against.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EOQ
// ---------------------------------------------------------------------------

/// Economic-order-quantity cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EoqConfig {
    /// Fixed cost of placing one order, in dollars.
    pub setup_cost: f64,
    /// Annual holding cost as a fraction of unit cost.
    pub holding_cost_rate: f64,
}

impl Default for EoqConfig {
    /// The documented default calibration: $50 per order, 25% holding rate.
    fn default() -> Self {
        Self {
            setup_cost: 50.0,
            holding_cost_rate: 0.25,
        }
    }
}

impl EoqConfig {
    /// The older calibration still used by some deployments: $65 per order.
    /// Same holding rate; only the ordering cost differs.
    pub fn legacy() -> Self {
        Self {
            setup_cost: 65.0,
            holding_cost_rate: 0.25,
        }
    }
}

// ---------------------------------------------------------------------------
// Safety stock
// ---------------------------------------------------------------------------

/// Buffer sizing for the additive ROP mode, used when a product snapshot
/// lacks the max-demand/max-lead figures the min-max mode needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafetyStockConfig {
    /// Days of average demand held as a flat buffer.
    pub safety_stock_days: f64,
}

impl Default for SafetyStockConfig {
    fn default() -> Self {
        Self {
            safety_stock_days: 7.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Vendor scoring
// ---------------------------------------------------------------------------

/// Weights and thresholds for vendor reliability scoring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VendorScoreConfig {
    /// Days past the expected date that still count as on-time.
    pub on_time_grace_days: i64,
    /// Composite weight on reliability (0-100 scale contribution).
    pub reliability_weight: f64,
    /// Composite weight on the lead-time score.
    pub lead_time_weight: f64,
    /// Composite weight on the cost score.
    pub cost_weight: f64,
    /// Reliability below this is a high-severity issue.
    pub low_reliability: f64,
    /// Reliability below this (but above `low_reliability`) is medium.
    pub fair_reliability: f64,
    /// Lead-time std-dev above this fraction of the mean lead time flags
    /// inconsistent delivery.
    pub variance_ratio: f64,
    /// Days without an order before a vendor is flagged inactive.
    pub inactive_days: i64,
}

impl Default for VendorScoreConfig {
    fn default() -> Self {
        Self {
            on_time_grace_days: 1,
            reliability_weight: 0.5,
            lead_time_weight: 0.3,
            cost_weight: 0.2,
            low_reliability: 0.60,
            fair_reliability: 0.80,
            variance_ratio: 0.30,
            inactive_days: 90,
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation flags
// ---------------------------------------------------------------------------

/// Thresholds for dead-stock / overstock / slow-mover flagging.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagThresholds {
    /// Days without a sale before stock counts as dead.
    pub dead_stock_days: i64,
    /// Days without a sale before dead stock escalates priority.
    pub dead_stock_priority_days: i64,
    /// Days of supply above which a product is overstocked.
    pub overstock_days_supply: f64,
    /// Days without a sale for the slow-mover check.
    pub slow_moving_days: i64,
    /// Daily sales below which the slow-mover check applies.
    pub slow_moving_max_daily: f64,
    /// Time-to-stockout at or under this many days forces high priority.
    pub stockout_priority_days: u32,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            dead_stock_days: 120,
            dead_stock_priority_days: 180,
            overstock_days_supply: 180.0,
            slow_moving_days: 90,
            slow_moving_max_daily: 0.5,
            stockout_priority_days: 7,
        }
    }
}

// ---------------------------------------------------------------------------
// Seasonality
// ---------------------------------------------------------------------------

/// One category×month demand multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalEntry {
    pub category: String,
    /// Calendar month, 1-12.
    pub month: u32,
    pub multiplier: f64,
}

/// Externally maintained category×month → multiplier table.
///
/// Unknown combinations resolve to 1.0 so a sparse table never distorts
/// demand for categories it does not mention.
#[derive(Clone, Debug, Default)]
pub struct SeasonalityTable {
    multipliers: HashMap<(String, u32), f64>,
}

impl SeasonalityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<SeasonalEntry>) -> Self {
        let mut table = Self::default();
        for e in entries {
            table.insert(e.category, e.month, e.multiplier);
        }
        table
    }

    pub fn insert(&mut self, category: impl Into<String>, month: u32, multiplier: f64) {
        self.multipliers.insert((category.into(), month), multiplier);
    }

    /// Multiplier for a category in a month; 1.0 when unconfigured.
    pub fn multiplier(&self, category: &str, month: u32) -> f64 {
        self.multipliers
            .get(&(category.to_string(), month))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Everything the recommendation engine needs, bundled for convenience.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub eoq: EoqConfig,
    pub safety: SafetyStockConfig,
    pub vendor: VendorScoreConfig,
    pub flags: FlagThresholds,
    pub seasonality: SeasonalityTable,
}
