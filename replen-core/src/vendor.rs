//! Vendor reliability scoring and ranking.
//!
//! From completed order history each vendor gets a reliability figure
//! (on-time deliveries over completed orders, with a grace period), a
//! lead-time distribution, and an average unit cost. Scores are relative
//! to benchmark values — by default the arithmetic mean across the
//! candidate vendor set, computed once per batch and then frozen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::VendorScoreConfig;

/// One purchase order as recorded by the vendor history provider.
/// `delivered_date = None` means the order never completed and is
/// excluded from reliability and lead-time math.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VendorOrderRecord {
    pub vendor_id: String,
    pub sku: String,
    pub order_date: NaiveDate,
    pub expected_date: NaiveDate,
    pub delivered_date: Option<NaiveDate>,
    pub unit_cost: f64,
}

/// Aggregated per-vendor metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VendorMetrics {
    pub vendor_id: String,
    /// On-time completed orders / completed orders, 0.0-1.0.
    pub reliability: f64,
    pub avg_lead_time_days: f64,
    /// Population standard deviation of actual lead times.
    pub lead_time_std_dev: f64,
    pub avg_cost_per_unit: f64,
    /// 0-100 weighted score; filled in by [`score_vendors`].
    pub composite_score: f64,
    pub completed_orders: u32,
    pub last_order_date: Option<NaiveDate>,
}

/// Benchmark values composite scores are measured against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VendorBenchmark {
    pub lead_time_days: f64,
    pub cost_per_unit: f64,
}

/// Severity of a vendor issue flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorIssueSeverity {
    High,
    Medium,
    Low,
}

/// A flagged vendor concern for the sourcing report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VendorIssue {
    pub vendor_id: String,
    pub severity: VendorIssueSeverity,
    pub detail: String,
}

/// Aggregate order history into per-vendor metrics.
///
/// Returns `None` when the vendor has no completed orders — an unscoreable
/// vendor is omitted from ranking rather than ranked on fabricated data.
pub fn vendor_metrics(
    vendor_id: &str,
    orders: &[VendorOrderRecord],
    config: &VendorScoreConfig,
) -> Option<VendorMetrics> {
    let mut lead_times: Vec<f64> = Vec::new();
    let mut on_time = 0u32;
    let mut cost_sum = 0.0;
    let mut last_order: Option<NaiveDate> = None;

    for order in orders.iter().filter(|o| o.vendor_id == vendor_id) {
        last_order = Some(match last_order {
            Some(d) => d.max(order.order_date),
            None => order.order_date,
        });
        let delivered = match order.delivered_date {
            Some(d) => d,
            None => continue,
        };
        let lead = (delivered - order.order_date).num_days().max(0) as f64;
        lead_times.push(lead);
        cost_sum += order.unit_cost.max(0.0);
        let grace_deadline = order.expected_date + chrono::Duration::days(config.on_time_grace_days);
        if delivered <= grace_deadline {
            on_time += 1;
        }
    }

    let completed = lead_times.len() as u32;
    if completed == 0 {
        return None;
    }

    let n = completed as f64;
    let avg_lead = lead_times.iter().sum::<f64>() / n;
    let variance = lead_times.iter().map(|l| (l - avg_lead).powi(2)).sum::<f64>() / n;

    Some(VendorMetrics {
        vendor_id: vendor_id.to_string(),
        reliability: on_time as f64 / n,
        avg_lead_time_days: avg_lead,
        lead_time_std_dev: variance.sqrt(),
        avg_cost_per_unit: cost_sum / n,
        composite_score: 0.0,
        completed_orders: completed,
        last_order_date: last_order,
    })
}

/// Benchmark from the candidate vendor set: arithmetic means.
pub fn benchmark_from(metrics: &[VendorMetrics]) -> VendorBenchmark {
    if metrics.is_empty() {
        return VendorBenchmark {
            lead_time_days: 0.0,
            cost_per_unit: 0.0,
        };
    }
    let n = metrics.len() as f64;
    VendorBenchmark {
        lead_time_days: metrics.iter().map(|m| m.avg_lead_time_days).sum::<f64>() / n,
        cost_per_unit: metrics.iter().map(|m| m.avg_cost_per_unit).sum::<f64>() / n,
    }
}

/// Relative score: matching the benchmark scores 100, twice the benchmark
/// scores 0, free/instant scores 200 before the clamp. A non-positive
/// benchmark can only arise when every candidate measures 0, which can
/// not be beaten — score it as par.
fn relative_score(value: f64, benchmark: f64) -> f64 {
    if benchmark <= 0.0 {
        return 100.0;
    }
    ((2.0 - value / benchmark) * 100.0).clamp(0.0, 100.0)
}

/// Weighted composite in [0, 100].
pub fn composite_score(
    metrics: &VendorMetrics,
    benchmark: &VendorBenchmark,
    config: &VendorScoreConfig,
) -> f64 {
    let lead_time_score = relative_score(metrics.avg_lead_time_days, benchmark.lead_time_days);
    let cost_score = relative_score(metrics.avg_cost_per_unit, benchmark.cost_per_unit);
    metrics.reliability * 100.0 * config.reliability_weight
        + lead_time_score * config.lead_time_weight
        + cost_score * config.cost_weight
}

/// Fill composite scores and rank descending. Ties break by lower cost,
/// then lower lead time — the order is deterministic for identical input.
pub fn score_vendors(
    mut metrics: Vec<VendorMetrics>,
    benchmark: &VendorBenchmark,
    config: &VendorScoreConfig,
) -> Vec<VendorMetrics> {
    for m in &mut metrics {
        m.composite_score = composite_score(m, benchmark, config);
    }
    metrics.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.avg_cost_per_unit
                    .partial_cmp(&b.avg_cost_per_unit)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(
                a.avg_lead_time_days
                    .partial_cmp(&b.avg_lead_time_days)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    metrics
}

/// Issue flags for one vendor's metrics.
pub fn vendor_issues(
    metrics: &VendorMetrics,
    config: &VendorScoreConfig,
    as_of: NaiveDate,
) -> Vec<VendorIssue> {
    let mut issues = Vec::new();

    if metrics.reliability < config.low_reliability {
        issues.push(VendorIssue {
            vendor_id: metrics.vendor_id.clone(),
            severity: VendorIssueSeverity::High,
            detail: format!(
                "on-time rate {:.0}% below {:.0}% floor",
                metrics.reliability * 100.0,
                config.low_reliability * 100.0
            ),
        });
    } else if metrics.reliability < config.fair_reliability {
        issues.push(VendorIssue {
            vendor_id: metrics.vendor_id.clone(),
            severity: VendorIssueSeverity::Medium,
            detail: format!("on-time rate {:.0}% needs attention", metrics.reliability * 100.0),
        });
    }

    if metrics.avg_lead_time_days > 0.0
        && metrics.lead_time_std_dev > config.variance_ratio * metrics.avg_lead_time_days
    {
        issues.push(VendorIssue {
            vendor_id: metrics.vendor_id.clone(),
            severity: VendorIssueSeverity::Medium,
            detail: format!(
                "inconsistent delivery: lead time varies ±{:.1} days around {:.1}",
                metrics.lead_time_std_dev, metrics.avg_lead_time_days
            ),
        });
    }

    let inactive = match metrics.last_order_date {
        Some(d) => (as_of - d).num_days() > config.inactive_days,
        None => true,
    };
    if inactive {
        issues.push(VendorIssue {
            vendor_id: metrics.vendor_id.clone(),
            severity: VendorIssueSeverity::Low,
            detail: format!("inactive: no order in over {} days", config.inactive_days),
        });
    }

    issues
}
