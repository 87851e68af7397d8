//! The production reorder-review pipeline.
//!
//! Stage wiring:
//! 1. `AsOfQueryHydrator` pins the snapshot date when the caller left it open
//! 2. `ReorderAnalysisSource` computes one candidate per SKU (bounded pool)
//! 3. `VendorOptionsHydrator` attaches ranked sourcing options
//! 4. `ActionableOnlyFilter` optionally drops healthy SKUs
//! 5. `UrgencyMagnitudeScorer` sets the secondary ranking key
//! 6. `RankedSelector` produces the stable (priority, magnitude) order
//! 7. `ActionQueueSideEffect` hands the selection to the action queue

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use replen_core::config::EngineConfig;

use crate::candidate_pipeline::{CandidatePipeline, ExecutionResult};
use crate::components::action_queue_side_effect::ActionQueueSideEffect;
use crate::components::actionable_only_filter::ActionableOnlyFilter;
use crate::components::as_of_query_hydrator::AsOfQueryHydrator;
use crate::components::ranked_selector::RankedSelector;
use crate::components::reorder_analysis_source::{BatchOptions, ReorderAnalysisSource};
use crate::components::urgency_magnitude_scorer::UrgencyMagnitudeScorer;
use crate::components::vendor_options_hydrator::VendorOptionsHydrator;
use crate::error::EngineError;
use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::providers::{
    ActionQueue, InventoryProvider, LoggingActionQueue, SalesHistoryProvider,
    VendorHistoryProvider,
};
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::SideEffect;
use crate::source::Source;
use crate::types::{Recommendation, ReorderQuery, ReorderReport};

/// External collaborators a review run needs.
pub struct ReviewProviders {
    pub inventory: Arc<dyn InventoryProvider>,
    pub sales: Arc<dyn SalesHistoryProvider>,
    pub vendors: Arc<dyn VendorHistoryProvider>,
}

pub struct ReorderReviewPipeline {
    query_hydrators: Vec<Box<dyn QueryHydrator<ReorderQuery>>>,
    sources: Vec<Box<dyn Source<ReorderQuery, Recommendation>>>,
    hydrators: Vec<Box<dyn Hydrator<ReorderQuery, Recommendation>>>,
    filters: Vec<Box<dyn Filter<ReorderQuery, Recommendation>>>,
    scorers: Vec<Box<dyn Scorer<ReorderQuery, Recommendation>>>,
    selector: RankedSelector,
    side_effects: Arc<Vec<Box<dyn SideEffect<ReorderQuery, Recommendation>>>>,
}

impl ReorderReviewPipeline {
    /// Production wiring with a log-only action queue.
    pub fn new(providers: ReviewProviders, config: EngineConfig, default_as_of: NaiveDate) -> Self {
        Self::builder(providers, config, default_as_of).build()
    }

    pub fn builder(
        providers: ReviewProviders,
        config: EngineConfig,
        default_as_of: NaiveDate,
    ) -> ReorderReviewPipelineBuilder {
        ReorderReviewPipelineBuilder {
            providers,
            config,
            default_as_of,
            batch_options: BatchOptions::default(),
            action_queue: Arc::new(LoggingActionQueue),
            max_results: None,
        }
    }
}

pub struct ReorderReviewPipelineBuilder {
    providers: ReviewProviders,
    config: EngineConfig,
    default_as_of: NaiveDate,
    batch_options: BatchOptions,
    action_queue: Arc<dyn ActionQueue>,
    max_results: Option<usize>,
}

impl ReorderReviewPipelineBuilder {
    pub fn batch_options(mut self, options: BatchOptions) -> Self {
        self.batch_options = options;
        self
    }

    pub fn action_queue(mut self, queue: Arc<dyn ActionQueue>) -> Self {
        self.action_queue = queue;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn build(self) -> ReorderReviewPipeline {
        let vendor_config = self.config.vendor;

        let query_hydrators: Vec<Box<dyn QueryHydrator<ReorderQuery>>> =
            vec![Box::new(AsOfQueryHydrator::new(self.default_as_of))];

        let sources: Vec<Box<dyn Source<ReorderQuery, Recommendation>>> =
            vec![Box::new(ReorderAnalysisSource::with_options(
                self.providers.inventory,
                self.providers.sales,
                self.config,
                self.batch_options,
            ))];

        let hydrators: Vec<Box<dyn Hydrator<ReorderQuery, Recommendation>>> = vec![Box::new(
            VendorOptionsHydrator::new(self.providers.vendors, vendor_config),
        )];

        let filters: Vec<Box<dyn Filter<ReorderQuery, Recommendation>>> =
            vec![Box::new(ActionableOnlyFilter)];

        let scorers: Vec<Box<dyn Scorer<ReorderQuery, Recommendation>>> =
            vec![Box::new(UrgencyMagnitudeScorer)];

        let selector = RankedSelector {
            max_results: self.max_results,
        };

        let side_effects: Arc<Vec<Box<dyn SideEffect<ReorderQuery, Recommendation>>>> =
            Arc::new(vec![Box::new(ActionQueueSideEffect::new(self.action_queue))]);

        ReorderReviewPipeline {
            query_hydrators,
            sources,
            hydrators,
            filters,
            scorers,
            selector,
            side_effects,
        }
    }
}

#[async_trait]
impl CandidatePipeline<ReorderQuery, Recommendation> for ReorderReviewPipeline {
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<ReorderQuery>>] {
        &self.query_hydrators
    }

    fn sources(&self) -> &[Box<dyn Source<ReorderQuery, Recommendation>>] {
        &self.sources
    }

    fn hydrators(&self) -> &[Box<dyn Hydrator<ReorderQuery, Recommendation>>] {
        &self.hydrators
    }

    fn filters(&self) -> &[Box<dyn Filter<ReorderQuery, Recommendation>>] {
        &self.filters
    }

    fn scorers(&self) -> &[Box<dyn Scorer<ReorderQuery, Recommendation>>] {
        &self.scorers
    }

    fn selector(&self) -> &dyn Selector<ReorderQuery, Recommendation> {
        &self.selector
    }

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<ReorderQuery, Recommendation>>>> {
        Arc::clone(&self.side_effects)
    }
}

/// Run a review to completion and convert the outcome into the report
/// contract: a cancelled run is an error, never a truncated ranked list
/// passed off as complete.
pub async fn run_reorder_review(
    pipeline: &ReorderReviewPipeline,
    query: ReorderQuery,
) -> Result<ReorderReport, EngineError> {
    let result: ExecutionResult<ReorderQuery, Recommendation> = pipeline.execute(query).await;
    if result.cancelled {
        return Err(EngineError::Cancelled);
    }
    Ok(ReorderReport {
        request_id: result.query.request_id,
        recommendations: result.selected_candidates,
        failed: result.failed,
    })
}
