//! Per-SKU reorder analysis.
//!
//! The source pulls the inventory snapshot once, then computes every SKU
//! independently on a bounded worker pool: demand forecast, bundle
//! virtual-stock substitution, reorder point, EOQ sizing, stockout risk,
//! and movement flags. Collaborator calls are the only suspension points;
//! each is wrapped in a timeout that fails just that SKU. ABC tiering and
//! rationale assembly run after the per-SKU barrier because class
//! boundaries depend on the full revenue-sorted set.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tokio::time::{timeout, Duration, Instant};

use replen_core::abc::{self, RevenuePoint};
use replen_core::config::EngineConfig;
use replen_core::demand::{self, DemandForecast, SaleRecord};
use replen_core::risk::{self, StockoutRisk};
use replen_core::types::{AbcClass, ProductKind, ProductSnapshot, StockStatus};
use replen_core::{bundle, eoq, reorder};

use crate::providers::{InventoryProvider, SalesHistoryProvider};
use crate::source::{Source, SourceResult};
use crate::types::{
    OrderSuggestion, Priority, Recommendation, RecommendationFlags, RecommendationMetrics,
    ReorderQuery, SkuFailure,
};
use crate::util;

/// Batch execution knobs. Concurrency bounds the in-flight collaborator
/// calls; the per-call timeout scopes a hung lookup to one SKU; the
/// deadline cancels the whole run cooperatively.
#[derive(Clone, Copy, Debug)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub call_timeout: Duration,
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            call_timeout: Duration::from_secs(5),
            deadline: None,
        }
    }
}

/// Source computing one [`Recommendation`] per SKU in the snapshot.
pub struct ReorderAnalysisSource {
    inventory: Arc<dyn InventoryProvider>,
    sales: Arc<dyn SalesHistoryProvider>,
    config: EngineConfig,
    options: BatchOptions,
}

impl ReorderAnalysisSource {
    pub fn new(
        inventory: Arc<dyn InventoryProvider>,
        sales: Arc<dyn SalesHistoryProvider>,
        config: EngineConfig,
    ) -> Self {
        Self::with_options(inventory, sales, config, BatchOptions::default())
    }

    pub fn with_options(
        inventory: Arc<dyn InventoryProvider>,
        sales: Arc<dyn SalesHistoryProvider>,
        config: EngineConfig,
        options: BatchOptions,
    ) -> Self {
        Self {
            inventory,
            sales,
            config,
            options,
        }
    }
}

enum SkuOutcome {
    Done(Box<SkuAnalysis>),
    Failed(SkuFailure),
    /// The deadline passed before this SKU was scheduled.
    Cancelled,
}

/// Everything computed for one SKU before the ABC barrier.
struct SkuAnalysis {
    product: ProductSnapshot,
    forecast: DemandForecast,
    /// On-hand quantity after bundle virtual-stock substitution.
    effective_qty: u32,
    limiting_component: Option<String>,
    rop: reorder::RopResult,
    eoq_qty: u32,
    order: OrderSuggestion,
    stockout: StockoutRisk,
    flags: RecommendationFlags,
    days_of_supply: Option<f64>,
    /// Annualized revenue proxy for ABC tiering.
    revenue: f64,
}

#[async_trait]
impl Source<ReorderQuery, Recommendation> for ReorderAnalysisSource {
    async fn fetch(&self, query: &ReorderQuery) -> Result<SourceResult<Recommendation>, String> {
        let as_of = query
            .as_of
            .ok_or_else(|| "as_of date missing; wire an AsOfQueryHydrator".to_string())?;

        let mut products = match timeout(self.options.call_timeout, self.inventory.products()).await
        {
            Err(_) => {
                return Err(format!(
                    "inventory snapshot timed out after {} ms",
                    self.options.call_timeout.as_millis()
                ))
            }
            Ok(Err(e)) => return Err(format!("inventory snapshot failed: {e}")),
            Ok(Ok(products)) => products,
        };
        if let Some(categories) = &query.categories {
            products.retain(|p| categories.iter().any(|c| c == &p.category));
        }

        let started = Instant::now();
        let deadline = self.options.deadline;
        let call_timeout = self.options.call_timeout;
        let config = &self.config;
        let sales = &self.sales;

        let outcomes: Vec<SkuOutcome> = stream::iter(products)
            .map(|product| async move {
                if let Some(limit) = deadline {
                    if started.elapsed() >= limit {
                        return SkuOutcome::Cancelled;
                    }
                }
                let history = match timeout(call_timeout, sales.history(&product.id)).await {
                    Err(_) => {
                        return SkuOutcome::Failed(SkuFailure {
                            product_id: product.id.clone(),
                            sku: product.sku.clone(),
                            reason: format!(
                                "sales history timed out after {} ms",
                                call_timeout.as_millis()
                            ),
                        })
                    }
                    Ok(Err(e)) => {
                        return SkuOutcome::Failed(SkuFailure {
                            product_id: product.id.clone(),
                            sku: product.sku.clone(),
                            reason: format!("sales history: {e}"),
                        })
                    }
                    Ok(Ok(history)) => history,
                };
                match analyze_sku(&product, &history, config, as_of) {
                    Ok(analysis) => SkuOutcome::Done(Box::new(analysis)),
                    Err(reason) => SkuOutcome::Failed(SkuFailure {
                        product_id: product.id.clone(),
                        sku: product.sku.clone(),
                        reason,
                    }),
                }
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let cancelled = outcomes.iter().any(|o| matches!(o, SkuOutcome::Cancelled));
        let mut failed = Vec::new();
        let mut analyses = Vec::new();
        for outcome in outcomes {
            match outcome {
                SkuOutcome::Done(analysis) => analyses.push(*analysis),
                SkuOutcome::Failed(failure) => failed.push(failure),
                SkuOutcome::Cancelled => {}
            }
        }

        // The worker pool completes in arrival order; restore a
        // deterministic base order so identical inputs rank identically.
        analyses.sort_by(|a, b| a.product.sku.cmp(&b.product.sku));
        failed.sort_by(|a, b| a.sku.cmp(&b.sku));

        // Barrier: ABC class boundaries need every SKU's revenue.
        let points: Vec<RevenuePoint> = analyses
            .iter()
            .map(|a| RevenuePoint {
                product_id: a.product.id.clone(),
                revenue: a.revenue,
            })
            .collect();
        let assignments = abc::classify(&points);

        let candidates = analyses
            .into_iter()
            .zip(assignments)
            .map(|(analysis, assignment)| finalize(analysis, assignment.class, config, as_of))
            .collect();

        Ok(SourceResult {
            candidates,
            failed,
            cancelled,
        })
    }

    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Pure per-SKU computation; no I/O below this line.
fn analyze_sku(
    product: &ProductSnapshot,
    history: &[SaleRecord],
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<SkuAnalysis, String> {
    let forecast = if history.is_empty() {
        demand::forecast_from_average(
            &product.id,
            product.avg_daily_sales,
            &config.seasonality,
            &product.category,
            as_of,
        )
    } else {
        demand::forecast_from_history(
            &product.id,
            history,
            &config.seasonality,
            &product.category,
            as_of,
        )
    };

    // Bundles sell from whatever their scarcest component allows; the
    // virtual stock substitutes for the on-hand quantity everywhere below.
    let (effective_qty, limiting_component) = match &product.kind {
        ProductKind::Simple => (product.current_qty, None),
        ProductKind::Bundle { components } => match bundle::resolve(components) {
            Ok(Some(availability)) => (
                availability.assemblable,
                Some(availability.limiting_component),
            ),
            Ok(None) => (product.current_qty, None),
            Err(e) => return Err(format!("bundle configuration: {e}")),
        },
    };

    let safety_stock = if product.max_daily_sales > 0.0 && product.max_lead_days > 0.0 {
        reorder::calculate_safety_stock(
            product.max_daily_sales,
            product.max_lead_days,
            product.avg_daily_sales,
            product.lead_time_days,
        )
    } else {
        // No variability data on the snapshot: flat buffer of
        // safety_stock_days worth of forecast demand.
        (forecast.daily_forecast.max(0.0) * config.safety.safety_stock_days).floor() as u32
    };

    let rop = reorder::evaluate(
        &product.sku,
        effective_qty,
        forecast.daily_forecast,
        product.lead_time_days,
        safety_stock,
    );

    let annual_demand = forecast.daily_forecast * 365.0;
    let eoq_qty = eoq::economic_order_quantity(annual_demand, product.cost_per_unit, &config.eoq);
    let target_stock = eoq::target_stock(rop.rop, safety_stock);
    let order_qty = if rop.should_reorder {
        eoq::recommended_order_qty(eoq_qty, target_stock, effective_qty)
    } else {
        0
    };

    let stockout = risk::evaluate(effective_qty, forecast.daily_forecast);

    // Movement flags run on raw sales velocity, not the seasonal forecast:
    // a seasonal lull must not turn healthy stock into "overstock".
    let days_of_supply = if product.avg_daily_sales > 0.0 {
        Some(effective_qty as f64 / product.avg_daily_sales)
    } else {
        None
    };
    let flags = RecommendationFlags {
        dead_stock: product.avg_daily_sales <= 0.0
            || product.stale_for_days(as_of, config.flags.dead_stock_days),
        overstock: days_of_supply.is_some_and(|d| d > config.flags.overstock_days_supply),
        slow_moving: product.avg_daily_sales < config.flags.slow_moving_max_daily
            && product.stale_for_days(as_of, config.flags.slow_moving_days),
    };

    let revenue =
        product.avg_daily_sales.max(0.0) * 365.0 * product.selling_price.max(0.0);

    Ok(SkuAnalysis {
        product: product.clone(),
        forecast,
        effective_qty,
        limiting_component,
        rop,
        eoq_qty,
        order: OrderSuggestion {
            qty: order_qty,
            target_stock,
        },
        stockout,
        flags,
        days_of_supply,
        revenue,
    })
}

/// Assemble the explained recommendation once the ABC class is known.
fn finalize(
    analysis: SkuAnalysis,
    abc_class: AbcClass,
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Recommendation {
    let SkuAnalysis {
        product,
        forecast,
        effective_qty,
        limiting_component,
        rop,
        eoq_qty,
        order,
        stockout,
        flags,
        days_of_supply,
        ..
    } = analysis;

    let current_issue = match rop.status {
        StockStatus::OutOfStock => match &limiting_component {
            Some(component) => format!("Out of stock: component {component} exhausted"),
            None => "Out of stock".to_string(),
        },
        StockStatus::UrgentReorder => format!(
            "Critically low: {} on hand against reorder point {}",
            effective_qty, rop.rop
        ),
        StockStatus::LowStock => format!(
            "Below reorder point: {} on hand against {}",
            effective_qty, rop.rop
        ),
        StockStatus::InStock => {
            if flags.dead_stock {
                match product.days_since_last_sale(as_of) {
                    Some(days) => format!("No sale in {days} days"),
                    None => "No sale on record".to_string(),
                }
            } else if flags.overstock {
                format!("{:.0} days of supply on hand", days_of_supply.unwrap_or(0.0))
            } else if flags.slow_moving {
                format!(
                    "Selling under {} units/day",
                    config.flags.slow_moving_max_daily
                )
            } else {
                "Stock level healthy".to_string()
            }
        }
    };

    // Action and impact text follow a first-match precedence:
    // dead stock > overstock > urgent/low stock > slow mover > stable.
    let stock_value = effective_qty as f64 * product.cost_per_unit.max(0.0);
    let (recommended_action, estimated_impact) = if flags.dead_stock {
        (
            format!(
                "Discount or liquidate {} units; pause replenishment",
                effective_qty
            ),
            format!("Frees ${:.2} tied up in dead stock", stock_value),
        )
    } else if flags.overstock {
        (
            format!(
                "Pause ordering until supply falls under {:.0} days",
                config.flags.overstock_days_supply
            ),
            format!(
                "Avoids ${:.2} in annual carrying cost",
                stock_value * config.eoq.holding_cost_rate
            ),
        )
    } else if rop.status != StockStatus::InStock {
        let action = format!(
            "Order {} units to reach target stock {}",
            order.qty, order.target_stock
        );
        let impact = if stockout.days_until_stockout < risk::NO_STOCKOUT_RISK_DAYS {
            format!(
                "Prevents stockout projected in {} days",
                stockout.days_until_stockout
            )
        } else {
            "Restores the safety buffer".to_string()
        };
        (action, impact)
    } else if flags.slow_moving {
        (
            "Review pricing or placement before the next order cycle".to_string(),
            format!("Protects ${:.2} of slow-moving stock", stock_value),
        )
    } else {
        (
            "No action needed".to_string(),
            "Stock level healthy".to_string(),
        )
    };

    let dead_stock_escalated = flags.dead_stock
        && product.stale_for_days(as_of, config.flags.dead_stock_priority_days);
    let priority = if matches!(
        rop.status,
        StockStatus::UrgentReorder | StockStatus::OutOfStock
    ) || stockout.days_until_stockout <= config.flags.stockout_priority_days
        || dead_stock_escalated
    {
        Priority::High
    } else if flags.overstock || flags.slow_moving {
        Priority::Medium
    } else {
        Priority::Low
    };

    let tier_note = match abc_class {
        AbcClass::A => "Class A revenue driver: protect availability",
        AbcClass::B => "Class B contributor: keep coverage balanced",
        AbcClass::C => "Class C tail item: minimize holding cost",
    };
    let mut sections = vec![current_issue.clone(), tier_note.to_string()];
    if flags.dead_stock {
        sections.push(match product.days_since_last_sale(as_of) {
            Some(days) => format!("dead stock: {days} days since last sale"),
            None => "dead stock: no sale on record".to_string(),
        });
    }
    if flags.overstock {
        sections.push(format!(
            "overstock: {:.0} days of supply",
            days_of_supply.unwrap_or(0.0)
        ));
    }
    if flags.slow_moving {
        sections.push(format!(
            "slow mover: under {} units/day",
            config.flags.slow_moving_max_daily
        ));
    }
    sections.push(estimated_impact.clone());
    let rationale = util::join_sections(&sections);

    Recommendation {
        product_id: product.id.clone(),
        sku: product.sku.clone(),
        category: product.category.clone(),
        abc_class,
        status: rop.status,
        urgency: stockout.urgency,
        priority,
        current_issue,
        recommended_action,
        estimated_impact,
        rationale,
        current_qty: effective_qty,
        lead_time_days: product.lead_time_days,
        metrics: RecommendationMetrics {
            rop: rop.rop,
            safety_stock: rop.safety_stock,
            eoq: eoq_qty,
            days_until_stockout: stockout.days_until_stockout,
            days_of_supply,
            weeks_of_stock: rop.weeks_of_stock,
        },
        order_suggestion: order,
        flags,
        demand_confidence: forecast.confidence,
        vendor_id: product.vendor_id,
        limiting_component,
        vendor_options: Vec::new(),
        sort_magnitude: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::providers::{InMemoryInventory, InMemorySalesHistory};
    use replen_core::bundle::BundleComponent;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn simple_product(id: &str, sku: &str, qty: u32, avg: f64) -> ProductSnapshot {
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
            selling_price: 24.0,
            last_sale_date: NaiveDate::from_ymd_opt(2025, 6, 10),
            vendor_id: None,
            kind: ProductKind::Simple,
        }
    }

    fn source_for(products: Vec<ProductSnapshot>) -> ReorderAnalysisSource {
        ReorderAnalysisSource::new(
            Arc::new(InMemoryInventory::new(products)),
            Arc::new(InMemorySalesHistory::empty()),
            EngineConfig::default(),
        )
    }

    fn query() -> ReorderQuery {
        ReorderQuery {
            request_id: "test-run".into(),
            as_of: Some(as_of()),
            categories: None,
            actionable_only: false,
        }
    }

    #[tokio::test]
    async fn out_of_stock_sku_gets_full_gap_order() {
        // avg 3/day, lead 14, flat 7-day buffer → safety 21, rop 63.
        let source = source_for(vec![simple_product("p1", "OOS-1", 0, 3.0)]);
        let result = source.fetch(&query()).await.unwrap();
        assert_eq!(result.candidates.len(), 1);

        let rec = &result.candidates[0];
        assert_eq!(rec.status, StockStatus::OutOfStock);
        assert_eq!(rec.metrics.safety_stock, 21);
        assert_eq!(rec.metrics.rop, 63);
        assert_eq!(rec.priority, Priority::High);
        assert!(rec.order_suggestion.qty >= rec.metrics.rop);
        assert!(rec.should_reorder());
    }

    #[tokio::test]
    async fn bundle_uses_virtual_stock_and_names_the_limiter() {
        let product = ProductSnapshot {
            kind: ProductKind::Bundle {
                components: vec![
                    BundleComponent {
                        component_id: "WID-100".into(),
                        quantity_required: 2,
                        current_stock: 25,
                    },
                    BundleComponent {
                        component_id: "BRK-300".into(),
                        quantity_required: 3,
                        current_stock: 45,
                    },
                ],
            },
            current_qty: 500, // ignored: virtual stock wins
            ..simple_product("p2", "KIT-200", 0, 1.0)
        };
        let source = source_for(vec![product]);
        let result = source.fetch(&query()).await.unwrap();

        let rec = &result.candidates[0];
        assert_eq!(rec.current_qty, 12); // min(25/2, 45/3)
        assert_eq!(rec.limiting_component.as_deref(), Some("WID-100"));
    }

    #[tokio::test]
    async fn malformed_bundle_is_excluded_not_infinite() {
        let bad = ProductSnapshot {
            kind: ProductKind::Bundle {
                components: vec![BundleComponent {
                    component_id: "X".into(),
                    quantity_required: 0,
                    current_stock: 10,
                }],
            },
            ..simple_product("p3", "BAD-KIT", 10, 1.0)
        };
        let source = source_for(vec![bad, simple_product("p1", "OK-1", 50, 1.0)]);
        let result = source.fetch(&query()).await.unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].sku, "OK-1");
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].sku, "BAD-KIT");
        assert!(result.failed[0].reason.contains("bundle configuration"));
    }

    struct FlakySales {
        fail_for: String,
    }

    #[async_trait]
    impl SalesHistoryProvider for FlakySales {
        async fn history(&self, product_id: &str) -> Result<Vec<SaleRecord>, ProviderError> {
            if product_id == self.fail_for {
                Err(ProviderError::Unavailable("sales API 503".into()))
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn provider_failure_scopes_to_one_sku() {
        let source = ReorderAnalysisSource::new(
            Arc::new(InMemoryInventory::new(vec![
                simple_product("p1", "GOOD-1", 50, 1.0),
                simple_product("p2", "FLAKY-2", 50, 1.0),
            ])),
            Arc::new(FlakySales {
                fail_for: "p2".into(),
            }),
            EngineConfig::default(),
        );
        let result = source.fetch(&query()).await.unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].sku, "GOOD-1");
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].sku, "FLAKY-2");
        assert!(result.failed[0].reason.contains("503"));
        assert!(!result.cancelled);
    }

    #[tokio::test]
    async fn expired_deadline_cancels_the_run() {
        let source = ReorderAnalysisSource::with_options(
            Arc::new(InMemoryInventory::new(vec![simple_product(
                "p1", "SKU-1", 10, 1.0,
            )])),
            Arc::new(InMemorySalesHistory::empty()),
            EngineConfig::default(),
            BatchOptions {
                deadline: Some(Duration::ZERO),
                ..BatchOptions::default()
            },
        );
        let result = source.fetch(&query()).await.unwrap();
        assert!(result.cancelled);
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn category_filter_narrows_the_snapshot() {
        let mut seasonal = simple_product("p2", "GDN-1", 50, 1.0);
        seasonal.category = "garden".into();
        let source = source_for(vec![simple_product("p1", "HRD-1", 50, 1.0), seasonal]);
        let result = source
            .fetch(&ReorderQuery {
                categories: Some(vec!["garden".into()]),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].sku, "GDN-1");
    }

    #[tokio::test]
    async fn missing_as_of_is_a_source_error() {
        let source = source_for(vec![]);
        let err = source
            .fetch(&ReorderQuery {
                as_of: None,
                ..query()
            })
            .await
            .unwrap_err();
        assert!(err.contains("as_of"));
    }

    #[tokio::test]
    async fn dead_stock_with_old_last_sale_escalates() {
        let mut product = simple_product("p1", "DEAD-1", 80, 0.0);
        product.last_sale_date = NaiveDate::from_ymd_opt(2024, 10, 1); // 257 days
        let source = source_for(vec![product]);
        let result = source.fetch(&query()).await.unwrap();

        let rec = &result.candidates[0];
        assert!(rec.flags.dead_stock);
        assert_eq!(rec.priority, Priority::High); // ≥ 180 days stale
        assert!(rec.recommended_action.contains("liquidate"));
        assert!(rec.rationale.contains("dead stock"));
    }

    #[tokio::test]
    async fn overstock_flag_and_action() {
        // 400 on hand at 1/day = 400 days of supply, sold recently.
        let product = simple_product("p1", "OVER-1", 400, 1.0);
        let source = source_for(vec![product]);
        let result = source.fetch(&query()).await.unwrap();

        let rec = &result.candidates[0];
        assert!(rec.flags.overstock);
        assert!(!rec.flags.dead_stock);
        assert_eq!(rec.priority, Priority::Medium);
        assert!(rec.recommended_action.contains("Pause ordering"));
    }
}
