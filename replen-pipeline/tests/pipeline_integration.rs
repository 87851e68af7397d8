use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use replen_core::bundle::BundleComponent;
use replen_core::config::EngineConfig;
use replen_core::demand::SaleRecord;
use replen_core::types::{ProductKind, ProductSnapshot, StockStatus};
use replen_core::vendor::VendorOrderRecord;

use replen_pipeline::candidate_pipeline::CandidatePipeline;
use replen_pipeline::components::reorder_analysis_source::BatchOptions;
use replen_pipeline::error::{EngineError, ProviderError};
use replen_pipeline::export;
use replen_pipeline::pipelines::reorder_review::{
    run_reorder_review, ReorderReviewPipeline, ReviewProviders,
};
use replen_pipeline::projections;
use replen_pipeline::providers::{
    InMemoryInventory, InMemorySalesHistory, InMemoryVendorHistory, SalesHistoryProvider,
};
use replen_pipeline::types::{Priority, ReorderQuery};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn product(id: &str, sku: &str, qty: u32, avg: f64) -> ProductSnapshot {
    ProductSnapshot {
        id: id.into(),
        sku: sku.into(),
        category: "hardware".into(),
        current_qty: qty,
        avg_daily_sales: avg,
        max_daily_sales: 0.0,
        lead_time_days: 14.0,
        max_lead_days: 0.0,
        cost_per_unit: 12.0,
        selling_price: 25.0,
        last_sale_date: Some(date(2025, 6, 10)),
        vendor_id: None,
        kind: ProductKind::Simple,
    }
}

/// A small but varied catalog:
/// - OOS-100: out of stock, selling 3/day — the urgent case
/// - LOW-200: below its reorder point
/// - FINE-300: comfortably stocked
/// - DEAD-400: 200 units, no sale since 2024 — dead stock
/// - KIT-500: a bundle limited by component WID-A
fn sample_products() -> Vec<ProductSnapshot> {
    vec![
        ProductSnapshot {
            selling_price: 40.0,
            ..product("p-oos", "OOS-100", 0, 3.0)
        },
        product("p-low", "LOW-200", 20, 2.0),
        product("p-fine", "FINE-300", 120, 1.5),
        ProductSnapshot {
            avg_daily_sales: 0.0,
            last_sale_date: Some(date(2024, 11, 1)),
            ..product("p-dead", "DEAD-400", 200, 0.0)
        },
        ProductSnapshot {
            kind: ProductKind::Bundle {
                components: vec![
                    BundleComponent {
                        component_id: "WID-A".into(),
                        quantity_required: 2,
                        current_stock: 25,
                    },
                    BundleComponent {
                        component_id: "BRK-B".into(),
                        quantity_required: 3,
                        current_stock: 45,
                    },
                ],
            },
            ..product("p-kit", "KIT-500", 0, 1.0)
        },
    ]
}

fn sample_vendor_orders() -> Vec<VendorOrderRecord> {
    let order = |vendor: &str, ordered: NaiveDate, lead: i64, late: i64, cost: f64| {
        let expected = ordered + chrono::Duration::days(lead);
        VendorOrderRecord {
            vendor_id: vendor.into(),
            sku: "OOS-100".into(),
            order_date: ordered,
            expected_date: expected,
            delivered_date: Some(expected + chrono::Duration::days(late)),
            unit_cost: cost,
        }
    };
    vec![
        order("v-steady", date(2025, 1, 6), 7, 0, 10.0),
        order("v-steady", date(2025, 2, 3), 7, 1, 10.0), // inside grace
        order("v-steady", date(2025, 3, 3), 7, 0, 10.0),
        order("v-tardy", date(2025, 1, 6), 5, 6, 8.0),
        order("v-tardy", date(2025, 2, 3), 5, 4, 8.0),
    ]
}

fn pipeline_for(products: Vec<ProductSnapshot>) -> ReorderReviewPipeline {
    let providers = ReviewProviders {
        inventory: Arc::new(InMemoryInventory::new(products)),
        sales: Arc::new(InMemorySalesHistory::empty()),
        vendors: Arc::new(InMemoryVendorHistory::new(sample_vendor_orders())),
    };
    ReorderReviewPipeline::new(providers, EngineConfig::default(), as_of())
}

fn query(request_id: &str) -> ReorderQuery {
    ReorderQuery {
        request_id: request_id.into(),
        as_of: Some(as_of()),
        categories: None,
        actionable_only: false,
    }
}

// ---------------------------------------------------------------------------
// Full pipeline runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn review_ranks_urgent_skus_first() {
    let pipeline = pipeline_for(sample_products());
    let result = pipeline.execute(query("run-1")).await;

    assert_eq!(result.retrieved_candidates.len(), 5);
    assert!(result.failed.is_empty());
    assert!(!result.cancelled);

    // Priority buckets are contiguous and ordered high → medium → low.
    let ranks: Vec<u8> = result
        .selected_candidates
        .iter()
        .map(|c| c.priority.rank())
        .collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    assert_eq!(ranks, sorted, "priority buckets must be in order: {ranks:?}");

    // The out-of-stock seller is high priority and fully explained.
    let oos = result
        .selected_candidates
        .iter()
        .find(|c| c.sku == "OOS-100")
        .expect("OOS-100 in results");
    assert_eq!(oos.status, StockStatus::OutOfStock);
    assert_eq!(oos.priority, Priority::High);
    assert_eq!(oos.metrics.rop, 63); // 3/day × 14 + 21 buffer
    assert!(oos.order_suggestion.qty >= oos.metrics.rop);
    assert!(!oos.rationale.is_empty());
    assert!(oos.rationale.contains(" | "));

    // The healthy SKU sits in the low bucket with no action.
    let fine = result
        .selected_candidates
        .iter()
        .find(|c| c.sku == "FINE-300")
        .expect("FINE-300 in results");
    assert_eq!(fine.priority, Priority::Low);
    assert_eq!(fine.order_suggestion.qty, 0);
}

#[tokio::test]
async fn bundle_is_scored_on_virtual_stock() {
    let pipeline = pipeline_for(sample_products());
    let result = pipeline.execute(query("run-bundle")).await;

    let kit = result
        .selected_candidates
        .iter()
        .find(|c| c.sku == "KIT-500")
        .expect("KIT-500 in results");
    // min(25/2, 45/3) = 12 assemblable, limited by WID-A.
    assert_eq!(kit.current_qty, 12);
    assert_eq!(kit.limiting_component.as_deref(), Some("WID-A"));
    assert_ne!(kit.status, StockStatus::OutOfStock);
}

#[tokio::test]
async fn dead_stock_is_flagged_and_escalated() {
    let pipeline = pipeline_for(sample_products());
    let result = pipeline.execute(query("run-dead")).await;

    let dead = result
        .selected_candidates
        .iter()
        .find(|c| c.sku == "DEAD-400")
        .expect("DEAD-400 in results");
    assert!(dead.flags.dead_stock);
    // Last sale Nov 2024 is over 180 days before the June 2025 as-of.
    assert_eq!(dead.priority, Priority::High);
    assert!(dead.recommended_action.contains("liquidate"));
}

#[tokio::test]
async fn vendor_options_rank_the_reliable_vendor_first() {
    let pipeline = pipeline_for(sample_products());
    let result = pipeline.execute(query("run-vendors")).await;

    let oos = result
        .selected_candidates
        .iter()
        .find(|c| c.sku == "OOS-100")
        .expect("OOS-100 in results");
    assert_eq!(oos.vendor_options.len(), 2);
    assert_eq!(oos.vendor_options[0].vendor_id, "v-steady");
    assert!(oos.vendor_options[0].recommended);
    assert!(
        oos.vendor_options[0].composite_score > oos.vendor_options[1].composite_score,
        "reliability should beat the cheaper, later vendor"
    );

    // SKUs with no vendor history carry no options.
    let fine = result
        .selected_candidates
        .iter()
        .find(|c| c.sku == "FINE-300")
        .unwrap();
    assert!(fine.vendor_options.is_empty());
}

#[tokio::test]
async fn actionable_only_run_drops_healthy_skus() {
    let pipeline = pipeline_for(sample_products());
    let result = pipeline
        .execute(ReorderQuery {
            actionable_only: true,
            ..query("run-actionable")
        })
        .await;

    assert!(result
        .selected_candidates
        .iter()
        .all(|c| c.needs_action()));
    assert!(!result
        .selected_candidates
        .iter()
        .any(|c| c.sku == "FINE-300"));
}

#[tokio::test]
async fn missing_as_of_falls_back_to_pipeline_default() {
    let pipeline = pipeline_for(sample_products());
    let result = pipeline
        .execute(ReorderQuery {
            as_of: None,
            ..query("run-default-date")
        })
        .await;
    assert_eq!(result.query.as_of, Some(as_of()));
    assert_eq!(result.retrieved_candidates.len(), 5);
}

// ---------------------------------------------------------------------------
// Partial failure and cancellation
// ---------------------------------------------------------------------------

struct FlakySales;

#[async_trait]
impl SalesHistoryProvider for FlakySales {
    async fn history(&self, product_id: &str) -> Result<Vec<SaleRecord>, ProviderError> {
        if product_id == "p-low" {
            Err(ProviderError::Unavailable("sales service 503".into()))
        } else {
            Ok(Vec::new())
        }
    }
}

#[tokio::test]
async fn failed_sku_is_reported_not_dropped() {
    let providers = ReviewProviders {
        inventory: Arc::new(InMemoryInventory::new(sample_products())),
        sales: Arc::new(FlakySales),
        vendors: Arc::new(InMemoryVendorHistory::new(sample_vendor_orders())),
    };
    let pipeline = ReorderReviewPipeline::new(providers, EngineConfig::default(), as_of());
    let report = run_reorder_review(&pipeline, query("run-flaky"))
        .await
        .unwrap();

    assert_eq!(report.recommendations.len(), 4);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].sku, "LOW-200");
    assert!(report.failed[0].reason.contains("503"));
}

#[tokio::test]
async fn expired_deadline_fails_the_run_instead_of_truncating() {
    let providers = ReviewProviders {
        inventory: Arc::new(InMemoryInventory::new(sample_products())),
        sales: Arc::new(InMemorySalesHistory::empty()),
        vendors: Arc::new(InMemoryVendorHistory::new(Vec::new())),
    };
    let pipeline = ReorderReviewPipeline::builder(providers, EngineConfig::default(), as_of())
        .batch_options(BatchOptions {
            deadline: Some(std::time::Duration::ZERO),
            ..BatchOptions::default()
        })
        .build();

    let outcome = run_reorder_review(&pipeline, query("run-deadline")).await;
    assert!(matches!(outcome, Err(EngineError::Cancelled)));
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identical_inputs_reproduce_identical_reports() {
    let first = run_reorder_review(&pipeline_for(sample_products()), query("run-a"))
        .await
        .unwrap();
    let second = run_reorder_review(&pipeline_for(sample_products()), query("run-a"))
        .await
        .unwrap();

    assert_eq!(first.recommendations, second.recommendations);
    assert_eq!(first.failed, second.failed);

    // Rationale text is byte-identical, not merely equivalent.
    for (a, b) in first
        .recommendations
        .iter()
        .zip(second.recommendations.iter())
    {
        assert_eq!(a.rationale, b.rationale);
    }
}

// ---------------------------------------------------------------------------
// Projections and export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn alerts_cover_exactly_the_reorder_set() {
    let report = run_reorder_review(&pipeline_for(sample_products()), query("run-alerts"))
        .await
        .unwrap();
    let alerts = projections::reorder_alerts(&report.recommendations);

    let expected: Vec<&str> = report
        .recommendations
        .iter()
        .filter(|r| r.should_reorder())
        .map(|r| r.sku.as_str())
        .collect();
    let actual: Vec<&str> = alerts.iter().map(|a| a.sku.as_str()).collect();
    assert_eq!(actual, expected);
    assert!(alerts.iter().any(|a| a.sku == "OOS-100"));
    assert!(!alerts.iter().any(|a| a.sku == "FINE-300"));
}

#[tokio::test]
async fn purchase_order_export_carries_projected_delivery() {
    let report = run_reorder_review(&pipeline_for(sample_products()), query("run-po"))
        .await
        .unwrap();
    let lines = export::purchase_order_lines(&report.recommendations, as_of());

    let oos_line = lines.iter().find(|l| l.sku == "OOS-100").unwrap();
    assert_eq!(oos_line.current_qty, 0);
    assert_eq!(oos_line.rop, 63);
    assert!(oos_line.recommended_order_qty >= 63);
    assert_eq!(oos_line.expected_delivery_date, date(2025, 6, 29)); // +14 days

    let csv = export::purchase_order_csv(&lines).unwrap();
    assert!(csv.starts_with("sku,current_qty,rop,recommended_order_qty,expected_delivery_date"));
    assert!(csv.contains("OOS-100"));

    // Healthy SKUs place no order.
    assert!(!lines.iter().any(|l| l.sku == "FINE-300"));
}
