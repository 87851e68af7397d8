use async_trait::async_trait;

use crate::util;

/// Hydrators enrich already-computed candidates with data from other
/// collaborators (vendor sourcing options, for instance) without changing
/// the candidate set itself.
#[async_trait]
pub trait Hydrator<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide whether this hydrator applies to the query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Return one enriched candidate per input candidate, same order.
    /// Only the fields this hydrator owns need to be populated.
    async fn hydrate(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    /// Copy this hydrator's fields from the enriched copy onto the
    /// original candidate.
    fn update(&self, candidate: &mut C, hydrated: C);

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
