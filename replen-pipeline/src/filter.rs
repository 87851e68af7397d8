use async_trait::async_trait;

use crate::util;

/// Outcome of one filter pass: candidates that continue and candidates
/// that were cut. Removed candidates stay visible to the orchestrator so
/// a run can account for everything it dropped.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

/// Filters run sequentially after hydration and partition the candidate
/// set against a predicate.
#[async_trait]
pub trait Filter<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide whether this filter applies to the query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Partition candidates into kept and removed sets.
    async fn filter(&self, query: &Q, candidates: Vec<C>) -> Result<FilterResult<C>, String>;

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
