use async_trait::async_trait;

use crate::types::SkuFailure;
use crate::util;

/// What a source produced for one run: the candidates it could compute,
/// the SKUs it could not (with reasons), and whether the run's deadline
/// cut computation short. A cancelled result is never presented as a
/// complete ranked list downstream.
#[derive(Clone, Debug)]
pub struct SourceResult<C> {
    pub candidates: Vec<C>,
    pub failed: Vec<SkuFailure>,
    pub cancelled: bool,
}

/// Sources compute the candidate set for a query. This is where all
/// collaborator I/O happens; later stages only reshape what a source
/// returned.
#[async_trait]
pub trait Source<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide whether this source applies to the query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Compute candidates. An `Err` means the source could not run at
    /// all (for example the inventory snapshot was unreachable); per-SKU
    /// problems belong in [`SourceResult::failed`] instead.
    async fn fetch(&self, query: &Q) -> Result<SourceResult<C>, String>;

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
