//! Demand estimation from raw sales history.
//!
//! Converts an ordered (date, qty) series into average and peak daily
//! demand, applies the seasonal multiplier for the product's category and
//! the current month, and attaches a confidence figure. Confidence grows
//! with the observed window and shrinks with day-to-day volatility
//! (coefficient of variation). Zero history never fails: demand is 0 and
//! confidence is 0, which downstream turns into a safety-stock-only ROP.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::SeasonalityTable;

/// One day's sales for a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub qty: f64,
}

/// Raw statistics over a sales window, before seasonal adjustment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyStats {
    /// Total quantity / window days.
    pub avg_daily: f64,
    /// Highest single-day total in the window.
    pub max_daily: f64,
    /// Calendar days spanned by the series, first to last inclusive.
    pub window_days: u32,
    /// Coefficient of variation of the daily series (0 when flat or empty).
    pub volatility: f64,
}

impl DailyStats {
    pub const EMPTY: DailyStats = DailyStats {
        avg_daily: 0.0,
        max_daily: 0.0,
        window_days: 0,
        volatility: 0.0,
    };
}

/// Smoothed demand estimate for one product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DemandForecast {
    pub product_id: String,
    /// Seasonally adjusted daily demand estimate.
    pub daily_forecast: f64,
    /// Confidence in the estimate, 0.0-1.0.
    pub confidence: f64,
}

/// Window days that mark the half-way point of the sample-size factor.
/// A 30-day window scores 0.5; longer windows asymptote toward 1.0.
const SAMPLE_MIDPOINT_DAYS: f64 = 30.0;

/// Confidence assigned to pre-aggregated averages, where no daily series
/// exists to measure volatility against.
const PREAGGREGATED_CONFIDENCE: f64 = 0.5;

/// Compute daily statistics over an ordered sales series.
///
/// Days inside the window with no recorded sale count as zero-sale days;
/// they pull the average down and the volatility up, exactly as a flat
/// export of the order ledger would.
pub fn daily_stats(history: &[SaleRecord]) -> DailyStats {
    if history.is_empty() {
        return DailyStats::EMPTY;
    }

    // Collapse to per-day totals; the series may carry multiple rows per day.
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sale in history {
        let qty = if sale.qty.is_finite() && sale.qty > 0.0 {
            sale.qty
        } else {
            0.0
        };
        *per_day.entry(sale.date).or_insert(0.0) += qty;
    }

    let first = *per_day.keys().next().expect("non-empty history");
    let last = *per_day.keys().next_back().expect("non-empty history");
    let window_days = ((last - first).num_days() + 1).max(1) as u32;

    let total: f64 = per_day.values().sum();
    let avg_daily = total / window_days as f64;
    let max_daily = per_day.values().copied().fold(0.0, f64::max);

    // Variance over the full window, counting the implicit zero-sale days.
    let recorded_days = per_day.len() as f64;
    let zero_days = window_days as f64 - recorded_days;
    let sum_sq: f64 = per_day.values().map(|q| (q - avg_daily).powi(2)).sum();
    let variance = (sum_sq + zero_days * avg_daily.powi(2)) / window_days as f64;
    let volatility = if avg_daily > 0.0 {
        variance.sqrt() / avg_daily
    } else {
        0.0
    };

    DailyStats {
        avg_daily,
        max_daily,
        window_days,
        volatility,
    }
}

/// Confidence heuristic: window factor × volatility factor, both in (0, 1].
fn confidence_for(stats: &DailyStats) -> f64 {
    if stats.window_days == 0 || stats.avg_daily <= 0.0 {
        return 0.0;
    }
    let window = stats.window_days as f64;
    let sample_factor = window / (window + SAMPLE_MIDPOINT_DAYS);
    let volatility_factor = 1.0 / (1.0 + stats.volatility);
    (sample_factor * volatility_factor).clamp(0.0, 1.0)
}

/// Apply the category×month seasonal multiplier to a raw daily average.
pub fn adjusted_daily_demand(
    raw_avg: f64,
    table: &SeasonalityTable,
    category: &str,
    as_of: NaiveDate,
) -> f64 {
    let raw = if raw_avg.is_finite() && raw_avg > 0.0 {
        raw_avg
    } else {
        0.0
    };
    raw * table.multiplier(category, as_of.month())
}

/// Estimate demand from a sales series.
pub fn forecast_from_history(
    product_id: &str,
    history: &[SaleRecord],
    table: &SeasonalityTable,
    category: &str,
    as_of: NaiveDate,
) -> DemandForecast {
    let stats = daily_stats(history);
    DemandForecast {
        product_id: product_id.to_string(),
        daily_forecast: adjusted_daily_demand(stats.avg_daily, table, category, as_of),
        confidence: confidence_for(&stats),
    }
}

/// Estimate demand from a pre-aggregated daily average when no series is
/// available. Volatility is unobservable here, so confidence is a fixed
/// middling value — and 0 when there is no demand at all.
pub fn forecast_from_average(
    product_id: &str,
    avg_daily_sales: f64,
    table: &SeasonalityTable,
    category: &str,
    as_of: NaiveDate,
) -> DemandForecast {
    let adjusted = adjusted_daily_demand(avg_daily_sales, table, category, as_of);
    let confidence = if adjusted > 0.0 {
        PREAGGREGATED_CONFIDENCE
    } else {
        0.0
    };
    DemandForecast {
        product_id: product_id.to_string(),
        daily_forecast: adjusted,
        confidence,
    }
}
