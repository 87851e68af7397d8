//! Dashboard projections.
//!
//! Logic-free views over the recommendation list for alerting and
//! suggestion surfaces. These only reshape fields; every number was
//! computed upstream.

use serde::Serialize;

use replen_core::types::{StockStatus, Urgency};

use crate::types::{Priority, Recommendation};

/// A reorder alert row. Emitted only for SKUs whose status calls for a
/// reorder.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReorderAlert {
    pub sku: String,
    pub status: StockStatus,
    pub urgency: Urgency,
    pub current_qty: u32,
    pub rop: u32,
    pub days_until_stockout: u32,
    pub message: String,
}

/// Alerts for every should-reorder SKU, in the list's ranked order.
pub fn reorder_alerts(recommendations: &[Recommendation]) -> Vec<ReorderAlert> {
    recommendations
        .iter()
        .filter(|r| r.should_reorder())
        .map(|r| ReorderAlert {
            sku: r.sku.clone(),
            status: r.status,
            urgency: r.urgency,
            current_qty: r.current_qty,
            rop: r.metrics.rop,
            days_until_stockout: r.metrics.days_until_stockout,
            message: r.current_issue.clone(),
        })
        .collect()
}

/// A suggestion row for the purchasing dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderSuggestionView {
    pub sku: String,
    pub priority: Priority,
    pub recommended_action: String,
    pub order_qty: u32,
    pub target_stock: u32,
}

/// Suggestions for every SKU with a non-zero order, in ranked order.
pub fn order_suggestions(recommendations: &[Recommendation]) -> Vec<OrderSuggestionView> {
    recommendations
        .iter()
        .filter(|r| r.order_suggestion.qty > 0)
        .map(|r| OrderSuggestionView {
            sku: r.sku.clone(),
            priority: r.priority,
            recommended_action: r.recommended_action.clone(),
            order_qty: r.order_suggestion.qty,
            target_stock: r.order_suggestion.target_stock,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderSuggestion, RecommendationMetrics};

    fn rec(sku: &str, status: StockStatus, order_qty: u32) -> Recommendation {
        Recommendation {
            sku: sku.into(),
            status,
            current_issue: format!("{sku} issue"),
            metrics: RecommendationMetrics {
                rop: 20,
                days_until_stockout: 5,
                ..RecommendationMetrics::default()
            },
            order_suggestion: OrderSuggestion {
                qty: order_qty,
                target_stock: 30,
            },
            ..Recommendation::default()
        }
    }

    #[test]
    fn alerts_only_for_reorder_statuses() {
        let recommendations = vec![
            rec("OOS", StockStatus::OutOfStock, 30),
            rec("FINE", StockStatus::InStock, 0),
            rec("LOW", StockStatus::LowStock, 10),
        ];
        let alerts = reorder_alerts(&recommendations);
        let skus: Vec<&str> = alerts.iter().map(|a| a.sku.as_str()).collect();
        assert_eq!(skus, vec!["OOS", "LOW"]);
        assert_eq!(alerts[0].message, "OOS issue");
    }

    #[test]
    fn suggestions_only_for_nonzero_orders() {
        let recommendations = vec![
            rec("ORDER", StockStatus::LowStock, 25),
            rec("SKIP", StockStatus::InStock, 0),
        ];
        let suggestions = order_suggestions(&recommendations);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].sku, "ORDER");
        assert_eq!(suggestions[0].order_qty, 25);
        assert_eq!(suggestions[0].target_stock, 30);
    }
}
