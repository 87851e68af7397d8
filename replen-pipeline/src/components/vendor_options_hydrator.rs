//! Vendor sourcing options.
//!
//! Fetches the vendor order history once per run, computes per-vendor
//! metrics, freezes the benchmark (arithmetic mean over the candidate
//! vendor set), scores and ranks, then attaches each candidate's eligible
//! vendors. A vendor is eligible for a SKU when it has order history for
//! that SKU or is the product's configured vendor.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{timeout, Duration};

use replen_core::config::VendorScoreConfig;
use replen_core::vendor::{self, VendorMetrics};

use crate::hydrator::Hydrator;
use crate::providers::VendorHistoryProvider;
use crate::types::{Recommendation, ReorderQuery, VendorOption};

pub struct VendorOptionsHydrator {
    vendors: Arc<dyn VendorHistoryProvider>,
    config: VendorScoreConfig,
    call_timeout: Duration,
}

impl VendorOptionsHydrator {
    pub fn new(vendors: Arc<dyn VendorHistoryProvider>, config: VendorScoreConfig) -> Self {
        Self {
            vendors,
            config,
            call_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

#[async_trait]
impl Hydrator<ReorderQuery, Recommendation> for VendorOptionsHydrator {
    async fn hydrate(
        &self,
        _query: &ReorderQuery,
        candidates: &[Recommendation],
    ) -> Result<Vec<Recommendation>, String> {
        let orders = match timeout(self.call_timeout, self.vendors.orders()).await {
            Err(_) => {
                return Err(format!(
                    "vendor history timed out after {} ms",
                    self.call_timeout.as_millis()
                ))
            }
            Ok(Err(e)) => return Err(format!("vendor history failed: {e}")),
            Ok(Ok(orders)) => orders,
        };

        // Aggregate once, then freeze: metrics and the benchmark are
        // read-only for the remainder of the run.
        let vendor_ids: BTreeSet<&str> = orders.iter().map(|o| o.vendor_id.as_str()).collect();
        let metrics: Vec<VendorMetrics> = vendor_ids
            .iter()
            .filter_map(|id| vendor::vendor_metrics(id, &orders, &self.config))
            .collect();
        let benchmark = vendor::benchmark_from(&metrics);
        let ranked = vendor::score_vendors(metrics, &benchmark, &self.config);

        let mut vendors_by_sku: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for order in &orders {
            vendors_by_sku
                .entry(order.sku.as_str())
                .or_default()
                .insert(order.vendor_id.as_str());
        }

        let hydrated = candidates
            .iter()
            .map(|candidate| {
                let eligible = vendors_by_sku.get(candidate.sku.as_str());
                let options: Vec<VendorOption> = ranked
                    .iter()
                    .filter(|m| {
                        eligible.is_some_and(|set| set.contains(m.vendor_id.as_str()))
                            || candidate.vendor_id.as_deref() == Some(m.vendor_id.as_str())
                    })
                    .enumerate()
                    .map(|(position, m)| VendorOption {
                        vendor_id: m.vendor_id.clone(),
                        composite_score: m.composite_score,
                        reliability: m.reliability,
                        avg_lead_time_days: m.avg_lead_time_days,
                        avg_cost_per_unit: m.avg_cost_per_unit,
                        recommended: position == 0,
                    })
                    .collect();
                Recommendation {
                    vendor_options: options,
                    ..Recommendation::default()
                }
            })
            .collect();

        Ok(hydrated)
    }

    fn update(&self, candidate: &mut Recommendation, hydrated: Recommendation) {
        candidate.vendor_options = hydrated.vendor_options;
    }
}
