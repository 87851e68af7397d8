use crate::selector::Selector;
use crate::types::{Recommendation, ReorderQuery};

/// Final output ordering: priority bucket first (high before medium
/// before low), then descending urgency magnitude within the bucket.
/// The sort is stable, so candidates that tie on both keys keep the
/// source's deterministic SKU order.
pub struct RankedSelector {
    pub max_results: Option<usize>,
}

impl Default for RankedSelector {
    fn default() -> Self {
        Self { max_results: None }
    }
}

impl Selector<ReorderQuery, Recommendation> for RankedSelector {
    fn score(&self, candidate: &Recommendation) -> f64 {
        candidate.sort_magnitude.unwrap_or(0.0)
    }

    fn sort(&self, candidates: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut ordered = candidates;
        ordered.sort_by(|a, b| {
            a.priority.rank().cmp(&b.priority.rank()).then_with(|| {
                let ma = a.sort_magnitude.unwrap_or(f64::NEG_INFINITY);
                let mb = b.sort_magnitude.unwrap_or(f64::NEG_INFINITY);
                match (ma.is_nan(), mb.is_nan()) {
                    (true, true) => std::cmp::Ordering::Equal,
                    (true, false) => std::cmp::Ordering::Greater,
                    (false, true) => std::cmp::Ordering::Less,
                    (false, false) => mb.partial_cmp(&ma).unwrap_or(std::cmp::Ordering::Equal),
                }
            })
        });
        ordered
    }

    fn size(&self) -> Option<usize> {
        self.max_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn candidate(sku: &str, priority: Priority, magnitude: f64) -> Recommendation {
        Recommendation {
            sku: sku.into(),
            priority,
            sort_magnitude: Some(magnitude),
            ..Recommendation::default()
        }
    }

    fn query() -> ReorderQuery {
        ReorderQuery {
            request_id: "r1".into(),
            as_of: None,
            categories: None,
            actionable_only: false,
        }
    }

    #[test]
    fn priority_buckets_dominate_magnitude() {
        let selector = RankedSelector::default();
        let selected = selector.select(
            &query(),
            vec![
                candidate("low-big", Priority::Low, 500.0),
                candidate("high-small", Priority::High, 5.0),
                candidate("med", Priority::Medium, 100.0),
            ],
        );
        let order: Vec<&str> = selected.iter().map(|c| c.sku.as_str()).collect();
        assert_eq!(order, vec!["high-small", "med", "low-big"]);
    }

    #[test]
    fn magnitude_breaks_ties_within_a_bucket() {
        let selector = RankedSelector::default();
        let selected = selector.select(
            &query(),
            vec![
                candidate("slow-burn", Priority::High, 10.0),
                candidate("fast-burn", Priority::High, 40.0),
            ],
        );
        assert_eq!(selected[0].sku, "fast-burn");
    }

    #[test]
    fn equal_keys_keep_incoming_order() {
        let selector = RankedSelector::default();
        let selected = selector.select(
            &query(),
            vec![
                candidate("first", Priority::High, 10.0),
                candidate("second", Priority::High, 10.0),
            ],
        );
        assert_eq!(selected[0].sku, "first");
        assert_eq!(selected[1].sku, "second");
    }

    #[test]
    fn truncation_respects_max_results() {
        let selector = RankedSelector {
            max_results: Some(1),
        };
        let selected = selector.select(
            &query(),
            vec![
                candidate("keep", Priority::High, 10.0),
                candidate("cut", Priority::Low, 10.0),
            ],
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].sku, "keep");
    }
}
