//! Economic order quantity.
//!
//! `eoq = ceil(sqrt(2 × annual_demand × setup_cost / holding_cost))` with
//! `holding_cost = unit_cost × holding_cost_rate`. Every degenerate domain
//! (no demand, free goods, zero holding rate) returns 0 instead of
//! dividing by zero.

use crate::config::EoqConfig;

/// Economic order quantity in whole units; 0 when any input is outside
/// its valid domain.
pub fn economic_order_quantity(annual_demand: f64, unit_cost: f64, config: &EoqConfig) -> u32 {
    if !annual_demand.is_finite() || annual_demand <= 0.0 {
        return 0;
    }
    if !unit_cost.is_finite() || unit_cost <= 0.0 {
        return 0;
    }
    let holding_cost = unit_cost * config.holding_cost_rate;
    if !holding_cost.is_finite() || holding_cost <= 0.0 {
        return 0;
    }
    let setup = config.setup_cost.max(0.0);
    ((2.0 * annual_demand * setup / holding_cost).sqrt()).ceil() as u32
}

/// Stock level an order should restore: reorder point plus safety stock.
pub fn target_stock(rop: u32, safety_stock: u32) -> u32 {
    rop.saturating_add(safety_stock)
}

/// Order size: at least the EOQ, and at least enough to close the gap to
/// the target stock. Slow movers whose EOQ rounds small still get an
/// order that refills the buffer.
pub fn recommended_order_qty(eoq: u32, target_stock: u32, current_qty: u32) -> u32 {
    eoq.max(target_stock.saturating_sub(current_qty))
}
