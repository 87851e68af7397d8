use async_trait::async_trait;
use chrono::NaiveDate;

use crate::query_hydrator::QueryHydrator;
use crate::types::ReorderQuery;

/// Fills in the snapshot date when the caller left it open.
///
/// The engine itself never reads a clock; the default comes from the
/// host, which keeps every computation reproducible for a given query.
pub struct AsOfQueryHydrator {
    default_as_of: NaiveDate,
}

impl AsOfQueryHydrator {
    pub fn new(default_as_of: NaiveDate) -> Self {
        Self { default_as_of }
    }
}

#[async_trait]
impl QueryHydrator<ReorderQuery> for AsOfQueryHydrator {
    fn enable(&self, query: &ReorderQuery) -> bool {
        query.as_of.is_none()
    }

    async fn hydrate(&self, query: &ReorderQuery) -> Result<ReorderQuery, String> {
        Ok(ReorderQuery {
            as_of: Some(self.default_as_of),
            ..query.clone()
        })
    }

    fn update(&self, query: &mut ReorderQuery, hydrated: ReorderQuery) {
        query.as_of = hydrated.as_of;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(as_of: Option<NaiveDate>) -> ReorderQuery {
        ReorderQuery {
            request_id: "r1".into(),
            as_of,
            categories: None,
            actionable_only: false,
        }
    }

    #[tokio::test]
    async fn fills_missing_as_of_only() {
        let default_day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let hydrator = AsOfQueryHydrator::new(default_day);

        let open = query(None);
        assert!(hydrator.enable(&open));
        let hydrated = hydrator.hydrate(&open).await.unwrap();
        assert_eq!(hydrated.as_of, Some(default_day));

        let pinned = query(NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(!hydrator.enable(&pinned));
    }
}
