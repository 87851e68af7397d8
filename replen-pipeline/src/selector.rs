use crate::util;

/// Selectors put the candidate list into its final order and optionally
/// truncate it.
///
/// The default `sort` orders by a single descending score with NaN pushed
/// to the end, so missing or divide-by-zero scores can never surface as
/// top results. Selectors with a composite ordering (a priority bucket
/// plus a magnitude, say) override `sort` directly; the override must be
/// a stable sort so equal keys keep their incoming order.
pub trait Selector<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Sort and truncate.
    fn select(&self, _query: &Q, candidates: Vec<C>) -> Vec<C> {
        let mut ordered = self.sort(candidates);
        if let Some(limit) = self.size() {
            ordered.truncate(limit);
        }
        ordered
    }

    /// Decide whether this selector applies to the query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// The scalar ranking score for one candidate.
    fn score(&self, candidate: &C) -> f64;

    /// Descending-score stable sort; NaN sorts last.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut ordered = candidates;
        ordered.sort_by(|a, b| {
            let (sa, sb) = (self.score(a), self.score(b));
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal),
            }
        });
        ordered
    }

    /// Maximum number of candidates to keep; `None` keeps all.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
