use async_trait::async_trait;

use crate::util;

/// Query hydrators run before candidate computation and fill in run
/// context the caller left open (the as-of date, defaults resolved from
/// configuration).
#[async_trait]
pub trait QueryHydrator<Q>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
{
    /// Decide whether this hydrator applies to the query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Produce a query with this hydrator's fields populated.
    async fn hydrate(&self, query: &Q) -> Result<Q, String>;

    /// Copy only the fields this hydrator owns back onto the query.
    fn update(&self, query: &mut Q, hydrated: Q);

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
