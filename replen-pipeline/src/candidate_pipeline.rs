//! Pipeline orchestration.
//!
//! A pipeline is a fixed arrangement of stages; `execute` drives a query
//! through them in order. Stage failures are contained: a failing query
//! hydrator leaves the query as-is, a failing source contributes nothing,
//! a failing hydrator/scorer leaves its fields unset, and a failing side
//! effect is logged. Only per-SKU failures and cancellation travel to the
//! caller, on the [`ExecutionResult`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::source::Source;
use crate::types::SkuFailure;

/// Queries expose a request id so every log line of a run correlates.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Everything one `execute` produced.
#[derive(Clone, Debug)]
pub struct ExecutionResult<Q, C> {
    /// The query after hydration.
    pub query: Q,
    /// All candidates the sources computed, before filtering and ranking.
    pub retrieved_candidates: Vec<C>,
    /// The final ranked (and possibly truncated) list.
    pub selected_candidates: Vec<C>,
    /// SKUs excluded from the list, with reasons.
    pub failed: Vec<SkuFailure>,
    /// True when a deadline stopped computation early. A cancelled result
    /// must not be treated as a complete ranked list.
    pub cancelled: bool,
}

#[async_trait]
pub trait CandidatePipeline<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + HasRequestId + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<Q>>];
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];
    fn hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn scorers(&self) -> &[Box<dyn Scorer<Q, C>>];
    fn selector(&self) -> &dyn Selector<Q, C>;
    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<Q, C>>>>;

    /// Drive a query through every stage.
    async fn execute(&self, query: Q) -> ExecutionResult<Q, C> {
        let mut query = query;

        for hydrator in self.query_hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            match hydrator.hydrate(&query).await {
                Ok(hydrated) => hydrator.update(&mut query, hydrated),
                Err(e) => log::warn!(
                    "request_id={} query hydrator {} failed: {}",
                    query.request_id(),
                    hydrator.name(),
                    e
                ),
            }
        }

        let mut candidates: Vec<C> = Vec::new();
        let mut failed: Vec<SkuFailure> = Vec::new();
        let mut cancelled = false;
        for source in self.sources() {
            if !source.enable(&query) {
                continue;
            }
            match source.fetch(&query).await {
                Ok(mut result) => {
                    candidates.append(&mut result.candidates);
                    failed.append(&mut result.failed);
                    cancelled |= result.cancelled;
                }
                Err(e) => log::error!(
                    "request_id={} source {} failed: {}",
                    query.request_id(),
                    source.name(),
                    e
                ),
            }
        }
        let retrieved_candidates = candidates.clone();

        for hydrator in self.hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            match hydrator.hydrate(&query, &candidates).await {
                Ok(hydrated) if hydrated.len() == candidates.len() => {
                    for (candidate, enriched) in candidates.iter_mut().zip(hydrated) {
                        hydrator.update(candidate, enriched);
                    }
                }
                Ok(hydrated) => log::warn!(
                    "request_id={} hydrator {} returned {} items for {} candidates; skipped",
                    query.request_id(),
                    hydrator.name(),
                    hydrated.len(),
                    candidates.len()
                ),
                Err(e) => log::warn!(
                    "request_id={} hydrator {} failed: {}",
                    query.request_id(),
                    hydrator.name(),
                    e
                ),
            }
        }

        for filter in self.filters() {
            if !filter.enable(&query) {
                continue;
            }
            match filter.filter(&query, std::mem::take(&mut candidates)).await {
                Ok(result) => {
                    if !result.removed.is_empty() {
                        log::debug!(
                            "request_id={} filter {} removed {} candidates",
                            query.request_id(),
                            filter.name(),
                            result.removed.len()
                        );
                    }
                    candidates = result.kept;
                }
                Err(e) => log::warn!(
                    "request_id={} filter {} failed: {}",
                    query.request_id(),
                    filter.name(),
                    e
                ),
            }
        }

        for scorer in self.scorers() {
            if !scorer.enable(&query) {
                continue;
            }
            match scorer.score(&query, &candidates).await {
                Ok(scored) if scored.len() == candidates.len() => {
                    for (candidate, scored) in candidates.iter_mut().zip(scored) {
                        scorer.update(candidate, scored);
                    }
                }
                Ok(scored) => log::warn!(
                    "request_id={} scorer {} returned {} items for {} candidates; skipped",
                    query.request_id(),
                    scorer.name(),
                    scored.len(),
                    candidates.len()
                ),
                Err(e) => log::warn!(
                    "request_id={} scorer {} failed: {}",
                    query.request_id(),
                    scorer.name(),
                    e
                ),
            }
        }

        let selected_candidates = self.selector().select(&query, candidates);

        let side_effects = self.side_effects();
        let input = Arc::new(SideEffectInput {
            query: Arc::new(query.clone()),
            selected_candidates: selected_candidates.clone(),
        });
        for side_effect in side_effects.iter() {
            if !side_effect.enable(Arc::clone(&input.query)) {
                continue;
            }
            if let Err(e) = side_effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} side effect {} failed: {}",
                    query.request_id(),
                    side_effect.name(),
                    e
                );
            }
        }

        ExecutionResult {
            query,
            retrieved_candidates,
            selected_candidates,
            failed,
            cancelled,
        }
    }
}
