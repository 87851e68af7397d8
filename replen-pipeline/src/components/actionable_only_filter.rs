use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{Recommendation, ReorderQuery};

/// Keeps only candidates that need attention — a reorder status or any
/// raised flag. Gated on the query, so full-inventory reviews pass
/// through untouched.
pub struct ActionableOnlyFilter;

#[async_trait]
impl Filter<ReorderQuery, Recommendation> for ActionableOnlyFilter {
    fn enable(&self, query: &ReorderQuery) -> bool {
        query.actionable_only
    }

    async fn filter(
        &self,
        _query: &ReorderQuery,
        candidates: Vec<Recommendation>,
    ) -> Result<FilterResult<Recommendation>, String> {
        let (kept, removed): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.needs_action());
        Ok(FilterResult { kept, removed })
    }
}
