use std::sync::Arc;

use async_trait::async_trait;

use crate::util;

/// Everything a side effect sees after selection completes.
#[derive(Clone)]
pub struct SideEffectInput<Q, C> {
    pub query: Arc<Q>,
    pub selected_candidates: Vec<C>,
}

/// Side effects run after selection and never change the pipeline result:
/// handing recommendations to the action queue, emitting metrics. A
/// failing side effect is logged, not propagated.
#[async_trait]
pub trait SideEffect<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide whether this side effect should run.
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    /// Execute against the selected candidates.
    async fn run(&self, input: Arc<SideEffectInput<Q, C>>) -> Result<(), String>;

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
