//! ABC revenue classification.
//!
//! Pareto tiering over the revenue-sorted-descending SKU set: class A
//! while the cumulative revenue share stays at or under 80%, class B at
//! or under 95%, class C for the tail. The boundary is inclusive — the
//! SKU that lands exactly on a cut belongs to the better class — and the
//! first SKU is always A so a single-product catalog is never tierless.

use serde::Serialize;

use crate::types::AbcClass;

/// Revenue observation for one product.
#[derive(Clone, Debug, PartialEq)]
pub struct RevenuePoint {
    pub product_id: String,
    pub revenue: f64,
}

/// Tier assignment with the cumulative share that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AbcAssignment {
    pub product_id: String,
    pub class: AbcClass,
    /// Cumulative revenue share including this product, 0.0-1.0.
    pub cumulative_share: f64,
}

const CLASS_A_SHARE: f64 = 0.80;
const CLASS_B_SHARE: f64 = 0.95;

/// Classify products by revenue contribution.
///
/// Ties in revenue keep input order (stable sort). Non-finite or negative
/// revenue counts as zero. With zero total revenue every product is C.
pub fn classify(points: &[RevenuePoint]) -> Vec<AbcAssignment> {
    let mut ordered: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let revenue = if p.revenue.is_finite() && p.revenue > 0.0 {
                p.revenue
            } else {
                0.0
            };
            (i, revenue)
        })
        .collect();
    ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = ordered.iter().map(|(_, r)| r).sum();
    if total <= 0.0 {
        return points
            .iter()
            .map(|p| AbcAssignment {
                product_id: p.product_id.clone(),
                class: AbcClass::C,
                cumulative_share: 0.0,
            })
            .collect();
    }

    let mut assignments = vec![None; points.len()];
    let mut cumulative = 0.0;
    for (rank, (index, revenue)) in ordered.iter().enumerate() {
        cumulative += revenue / total;
        let class = if *revenue <= 0.0 {
            AbcClass::C
        } else if rank == 0 || cumulative <= CLASS_A_SHARE {
            AbcClass::A
        } else if cumulative <= CLASS_B_SHARE {
            AbcClass::B
        } else {
            AbcClass::C
        };
        assignments[*index] = Some(AbcAssignment {
            product_id: points[*index].product_id.clone(),
            class,
            cumulative_share: cumulative,
        });
    }

    assignments
        .into_iter()
        .map(|a| a.expect("every index assigned"))
        .collect()
}
