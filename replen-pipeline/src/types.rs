use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use replen_core::types::{AbcClass, StockStatus, Urgency};

use crate::candidate_pipeline::HasRequestId;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// One reorder-review run over the current inventory snapshot.
#[derive(Clone, Debug)]
pub struct ReorderQuery {
    pub request_id: String,
    /// Snapshot date for seasonality, staleness, and delivery projections.
    /// Left `None` by callers that want the pipeline's default filled in
    /// by an `AsOfQueryHydrator`.
    pub as_of: Option<NaiveDate>,
    /// Restrict the run to these categories; `None` means all.
    pub categories: Option<Vec<String>>,
    /// Drop candidates that need no action at all.
    pub actionable_only: bool,
}

impl HasRequestId for ReorderQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

// ---------------------------------------------------------------------------
// Candidate types
// ---------------------------------------------------------------------------

/// Final ranking bucket. Ordering is High before Medium before Low.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: smaller sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

/// Movement flags raised by the synthesizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationFlags {
    pub dead_stock: bool,
    pub overstock: bool,
    pub slow_moving: bool,
}

impl RecommendationFlags {
    pub fn any(&self) -> bool {
        self.dead_stock || self.overstock || self.slow_moving
    }
}

/// Numeric evidence behind a recommendation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RecommendationMetrics {
    pub rop: u32,
    pub safety_stock: u32,
    pub eoq: u32,
    pub days_until_stockout: u32,
    /// Current quantity in days of raw sales velocity; `None` with no sales.
    pub days_of_supply: Option<f64>,
    pub weeks_of_stock: Option<f64>,
}

/// Suggested order for the purchasing workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct OrderSuggestion {
    pub qty: u32,
    pub target_stock: u32,
}

/// A ranked vendor choice attached by the vendor-options hydrator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VendorOption {
    pub vendor_id: String,
    pub composite_score: f64,
    pub reliability: f64,
    pub avg_lead_time_days: f64,
    pub avg_cost_per_unit: f64,
    pub recommended: bool,
}

/// One explained, ranked recommendation — the pipeline's candidate type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub product_id: String,
    pub sku: String,
    pub category: String,
    pub abc_class: AbcClass,
    /// Quantity/ROP-ratio bucket.
    pub status: StockStatus,
    /// Time-to-stockout bucket, kept separate from `status`.
    pub urgency: Urgency,
    pub priority: Priority,
    pub current_issue: String,
    pub recommended_action: String,
    pub estimated_impact: String,
    /// Deterministic concatenation of issue, tier note, flag notes, and
    /// impact; identical inputs reproduce it byte for byte.
    pub rationale: String,
    /// Effective on-hand quantity (virtual stock for bundles).
    pub current_qty: u32,
    pub lead_time_days: f64,
    pub metrics: RecommendationMetrics,
    pub order_suggestion: OrderSuggestion,
    pub flags: RecommendationFlags,
    pub demand_confidence: f64,
    pub vendor_id: Option<String>,
    /// Bundle bottleneck, when the SKU is a kit.
    pub limiting_component: Option<String>,
    pub vendor_options: Vec<VendorOption>,
    /// Secondary ranking key, set by the urgency-magnitude scorer.
    pub sort_magnitude: Option<f64>,
}

impl Recommendation {
    pub fn should_reorder(&self) -> bool {
        self.status.should_reorder()
    }

    /// True when anything about this SKU calls for attention.
    pub fn needs_action(&self) -> bool {
        self.should_reorder() || self.flags.any()
    }
}

impl Default for Recommendation {
    fn default() -> Self {
        Self {
            product_id: String::new(),
            sku: String::new(),
            category: String::new(),
            abc_class: AbcClass::C,
            status: StockStatus::InStock,
            urgency: Urgency::Low,
            priority: Priority::Low,
            current_issue: String::new(),
            recommended_action: String::new(),
            estimated_impact: String::new(),
            rationale: String::new(),
            current_qty: 0,
            lead_time_days: 0.0,
            metrics: RecommendationMetrics::default(),
            order_suggestion: OrderSuggestion::default(),
            flags: RecommendationFlags::default(),
            demand_confidence: 0.0,
            vendor_id: None,
            limiting_component: None,
            vendor_options: Vec::new(),
            sort_magnitude: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Batch outcome types
// ---------------------------------------------------------------------------

/// A SKU excluded from the ranked list, with the reason it was excluded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkuFailure {
    pub product_id: String,
    pub sku: String,
    pub reason: String,
}

/// Final batch output: the ranked list plus the explicit failed list.
/// Partial success is the contract — a failed SKU never silently drops.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReorderReport {
    pub request_id: String,
    pub recommendations: Vec<Recommendation>,
    pub failed: Vec<SkuFailure>,
}
