use std::sync::Arc;

use async_trait::async_trait;

use crate::providers::ActionQueue;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{Recommendation, ReorderQuery};

/// Hands the selected recommendations to the action queue after
/// selection. The queue enforces at-most-one-pending-per-product; this
/// side effect only delivers.
pub struct ActionQueueSideEffect {
    queue: Arc<dyn ActionQueue>,
}

impl ActionQueueSideEffect {
    pub fn new(queue: Arc<dyn ActionQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl SideEffect<ReorderQuery, Recommendation> for ActionQueueSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<ReorderQuery, Recommendation>>,
    ) -> Result<(), String> {
        self.queue.submit(&input.selected_candidates).await?;
        log::info!(
            "request_id={} handed {} recommendations to the action queue",
            input.query.request_id,
            input.selected_candidates.len()
        );
        Ok(())
    }
}
