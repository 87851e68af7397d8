use async_trait::async_trait;

use crate::scorer::Scorer;
use crate::types::{Recommendation, ReorderQuery};

/// Sets the secondary ranking key: `rop − safety_stock`, the lead-time
/// demand component of the reorder point. Within a priority bucket,
/// faster-burning SKUs sort first.
pub struct UrgencyMagnitudeScorer;

#[async_trait]
impl Scorer<ReorderQuery, Recommendation> for UrgencyMagnitudeScorer {
    async fn score(
        &self,
        _query: &ReorderQuery,
        candidates: &[Recommendation],
    ) -> Result<Vec<Recommendation>, String> {
        let scored = candidates
            .iter()
            .map(|c| Recommendation {
                sort_magnitude: Some(
                    c.metrics.rop.saturating_sub(c.metrics.safety_stock) as f64
                ),
                ..Recommendation::default()
            })
            .collect();
        Ok(scored)
    }

    fn update(&self, candidate: &mut Recommendation, scored: Recommendation) {
        candidate.sort_magnitude = scored.sort_magnitude;
    }
}
