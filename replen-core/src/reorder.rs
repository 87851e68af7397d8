//! Reorder point and safety stock.
//!
//! Two sizing modes:
//! - **Additive**: a flat buffer of `safety_stock_days` worth of average
//!   demand on top of lead-time demand.
//! - **Min-max**: safety stock sized from the worst observed demand over
//!   the worst observed lead time, so variability is captured explicitly
//!   instead of assumed.
//!
//! All arithmetic is total: negative or non-finite inputs clamp to 0.

use serde::Serialize;

use crate::types::StockStatus;

/// Reorder evaluation for one SKU.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RopResult {
    pub sku: String,
    pub rop: u32,
    pub safety_stock: u32,
    pub status: StockStatus,
    /// Current quantity in days of adjusted demand; `None` with no demand.
    pub days_of_cover: Option<f64>,
    /// `days_of_cover / 7`, rounded to 2 decimals.
    pub weeks_of_stock: Option<f64>,
    pub should_reorder: bool,
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Additive reorder point: `floor(d×lead + d×safety_days)`.
///
/// Returns 0 for any negative input rather than erroring; bad upstream
/// data degrades to "reorder immediately at zero stock" instead of
/// failing the batch.
pub fn calculate_rop_additive(avg_daily_demand: f64, lead_time_days: f64, safety_stock_days: f64) -> u32 {
    let d = sanitize(avg_daily_demand);
    let lead = sanitize(lead_time_days);
    let buffer = sanitize(safety_stock_days);
    (d * lead + d * buffer).floor() as u32
}

/// Min-max safety stock: `max(0, floor(max_daily×max_lead − avg_daily×avg_lead))`.
///
/// Never negative: when peak demand does not exceed average demand there
/// is nothing to buffer.
pub fn calculate_safety_stock(
    max_daily_demand: f64,
    max_lead_days: f64,
    avg_daily_demand: f64,
    avg_lead_days: f64,
) -> u32 {
    let worst = sanitize(max_daily_demand) * sanitize(max_lead_days);
    let expected = sanitize(avg_daily_demand) * sanitize(avg_lead_days);
    (worst - expected).max(0.0).floor() as u32
}

/// Reorder point with an explicit safety stock:
/// `floor(adjusted_daily×lead + safety_stock)`.
pub fn calculate_rop(adjusted_daily_demand: f64, lead_time_days: f64, safety_stock: u32) -> u32 {
    let demand = sanitize(adjusted_daily_demand) * sanitize(lead_time_days);
    (demand + safety_stock as f64).floor() as u32
}

/// Classify stock status against the reorder point.
///
/// Boundary rule (canonical, inclusive): zero quantity is out of stock;
/// `0 < qty ≤ rop×0.5` is urgent; `rop×0.5 < qty ≤ rop` is low;
/// above the ROP is in stock.
pub fn classify_status(current_qty: u32, rop: u32) -> StockStatus {
    if current_qty == 0 {
        return StockStatus::OutOfStock;
    }
    let qty = current_qty as f64;
    let half = rop as f64 * 0.5;
    if qty <= half {
        StockStatus::UrgentReorder
    } else if qty <= rop as f64 {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Days of demand the current quantity covers; `None` without demand.
pub fn days_of_cover(current_qty: u32, adjusted_daily_demand: f64) -> Option<f64> {
    let demand = sanitize(adjusted_daily_demand);
    if demand > 0.0 {
        Some(current_qty as f64 / demand)
    } else {
        None
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Full min-max evaluation for one SKU.
pub fn evaluate(
    sku: &str,
    current_qty: u32,
    adjusted_daily_demand: f64,
    lead_time_days: f64,
    safety_stock: u32,
) -> RopResult {
    let rop = calculate_rop(adjusted_daily_demand, lead_time_days, safety_stock);
    let status = classify_status(current_qty, rop);
    let cover = days_of_cover(current_qty, adjusted_daily_demand);
    RopResult {
        sku: sku.to_string(),
        rop,
        safety_stock,
        status,
        days_of_cover: cover,
        weeks_of_stock: cover.map(|d| round2(d / 7.0)),
        should_reorder: status.should_reorder(),
    }
}
