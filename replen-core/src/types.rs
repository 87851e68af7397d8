use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bundle::BundleComponent;

// ---------------------------------------------------------------------------
// Product snapshot
// ---------------------------------------------------------------------------

/// Whether a product is sold as-is or assembled from component SKUs.
///
/// Resolved once at ingestion. Call sites dispatch on this variant instead
/// of re-detecting "is this a bundle" from tags or metafields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProductKind {
    Simple,
    Bundle { components: Vec<BundleComponent> },
}

impl ProductKind {
    pub fn is_bundle(&self) -> bool {
        matches!(self, ProductKind::Bundle { .. })
    }
}

/// Immutable per-run snapshot of one product/SKU.
///
/// Quantities are whole units; demand and cost figures are daily/unit
/// averages supplied by the inventory and sales systems.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub sku: String,
    pub category: String,
    pub current_qty: u32,
    pub avg_daily_sales: f64,
    pub max_daily_sales: f64,
    pub lead_time_days: f64,
    pub max_lead_days: f64,
    pub cost_per_unit: f64,
    pub selling_price: f64,
    pub last_sale_date: Option<NaiveDate>,
    pub vendor_id: Option<String>,
    pub kind: ProductKind,
}

impl ProductSnapshot {
    /// Days since the last recorded sale, `None` when the product has
    /// never sold. Callers treating "never sold" as stale should test
    /// with [`ProductSnapshot::stale_for_days`].
    pub fn days_since_last_sale(&self, as_of: NaiveDate) -> Option<i64> {
        self.last_sale_date.map(|d| (as_of - d).num_days())
    }

    /// True when the product has not sold within `days` of `as_of`.
    /// A product with no sale on record counts as stale for any horizon.
    pub fn stale_for_days(&self, as_of: NaiveDate, days: i64) -> bool {
        match self.days_since_last_sale(as_of) {
            Some(elapsed) => elapsed >= days,
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Stock status relative to the reorder point.
///
/// A closed enum so a typo can never flow through classification and
/// ranking the way stringly-typed buckets can.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    UrgentReorder,
    OutOfStock,
}

impl StockStatus {
    /// Anything other than comfortably in stock warrants a reorder.
    pub fn should_reorder(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "In Stock"),
            StockStatus::LowStock => write!(f, "Low Stock"),
            StockStatus::UrgentReorder => write!(f, "Urgent Reorder"),
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
        }
    }
}

/// Time-to-stockout urgency, distinct from [`StockStatus`].
///
/// Status is a quantity/ROP ratio; urgency is a forecast-driven clock.
/// Both are exposed side by side and never collapsed into one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Critical => write!(f, "Critical"),
            Urgency::High => write!(f, "High"),
            Urgency::Medium => write!(f, "Medium"),
            Urgency::Low => write!(f, "Low"),
        }
    }
}

/// Revenue tier from Pareto classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(last_sale: Option<NaiveDate>) -> ProductSnapshot {
        ProductSnapshot {
            id: "p1".into(),
            sku: "SKU-1".into(),
            category: "general".into(),
            current_qty: 10,
            avg_daily_sales: 1.0,
            max_daily_sales: 2.0,
            lead_time_days: 7.0,
            max_lead_days: 10.0,
            cost_per_unit: 5.0,
            selling_price: 9.0,
            last_sale_date: last_sale,
            vendor_id: None,
            kind: ProductKind::Simple,
        }
    }

    #[test]
    fn days_since_last_sale_counts_from_as_of() {
        let p = snapshot(NaiveDate::from_ymd_opt(2025, 1, 1));
        let as_of = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(p.days_since_last_sale(as_of), Some(120));
        assert!(p.stale_for_days(as_of, 120));
        assert!(!p.stale_for_days(as_of, 121));
    }

    #[test]
    fn never_sold_is_stale_for_any_horizon() {
        let p = snapshot(None);
        let as_of = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(p.days_since_last_sale(as_of), None);
        assert!(p.stale_for_days(as_of, 120));
        assert!(p.stale_for_days(as_of, 100_000));
    }

    #[test]
    fn status_should_reorder_excludes_only_in_stock() {
        assert!(!StockStatus::InStock.should_reorder());
        assert!(StockStatus::LowStock.should_reorder());
        assert!(StockStatus::UrgentReorder.should_reorder());
        assert!(StockStatus::OutOfStock.should_reorder());
    }
}
