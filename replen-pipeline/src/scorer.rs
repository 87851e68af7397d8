use async_trait::async_trait;

use crate::util;

/// Scorers compute ranking signals for each candidate. They return fresh
/// candidate values carrying only the scored fields; the orchestrator
/// merges those back via [`Scorer::update`], so scorers cannot clobber
/// fields they do not own.
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide whether this scorer applies to the query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Score all candidates, returning one scored value per input in the
    /// same order.
    async fn score(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    /// Copy this scorer's fields from the scored copy onto the original.
    fn update(&self, candidate: &mut C, scored: C);

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
