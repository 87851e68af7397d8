//! Bundle/kit stock resolution.
//!
//! A bundle's sellable stock is whatever its scarcest component allows:
//! `available_for_bundle = floor(component_stock / quantity_required)`
//! per component, and the bundle can be assembled `min` of those times.
//! The component at that minimum is the limiting component; ties resolve
//! to the first entry of a stable ascending sort, never iteration order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One component line of a bundle's bill of materials, with the
/// component's current stock from the inventory snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleComponent {
    pub component_id: String,
    pub quantity_required: u32,
    pub current_stock: u32,
}

impl BundleComponent {
    /// How many bundles this component alone could supply.
    /// Caller must have validated `quantity_required > 0`.
    fn available_for_bundle(&self) -> u32 {
        self.current_stock / self.quantity_required
    }
}

/// Malformed bundle definitions exclude the SKU from resolution; they are
/// never treated as infinite capacity.
#[derive(Debug, Error, PartialEq)]
pub enum BundleConfigError {
    #[error("component {component_id}: quantity_required must be positive")]
    ZeroQuantityRequired { component_id: String },
}

/// Per-component availability, reported alongside the bundle total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentAvailability {
    pub component_id: String,
    pub available_for_bundle: u32,
}

/// Bottleneck-limited availability for one bundle.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BundleAvailability {
    /// Bundles assemblable right now.
    pub assemblable: u32,
    /// The component constraining `assemblable`.
    pub limiting_component: String,
    /// All components, ascending by available-for-bundle.
    pub components: Vec<ComponentAvailability>,
}

/// Units of a component an order must add to support a target number of
/// assemblable bundles.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentOrder {
    pub component_id: String,
    pub required_order_qty: u32,
}

/// Resolve a bundle's availability from its component stocks.
///
/// Returns `Ok(None)` for an empty component list: that product is not a
/// bundle, and the caller falls back to the standard ROP path. This is
/// capability dispatch, not a type hierarchy.
pub fn resolve(components: &[BundleComponent]) -> Result<Option<BundleAvailability>, BundleConfigError> {
    if components.is_empty() {
        return Ok(None);
    }

    for c in components {
        if c.quantity_required == 0 {
            return Err(BundleConfigError::ZeroQuantityRequired {
                component_id: c.component_id.clone(),
            });
        }
    }

    let mut availability: Vec<ComponentAvailability> = components
        .iter()
        .map(|c| ComponentAvailability {
            component_id: c.component_id.clone(),
            available_for_bundle: c.available_for_bundle(),
        })
        .collect();

    // Stable ascending sort: equal minima keep their input order, so the
    // limiting component is deterministic across runs and platforms.
    availability.sort_by_key(|a| a.available_for_bundle);

    let limiting = availability.first().expect("non-empty components");
    Ok(Some(BundleAvailability {
        assemblable: limiting.available_for_bundle,
        limiting_component: limiting.component_id.clone(),
        components: availability,
    }))
}

/// Component orders needed to reach `target` assemblable bundles:
/// `max(0, target × quantity_required − current_stock)` per component.
/// A constrained minimum-increase computation, not a general solver.
pub fn required_component_orders(
    components: &[BundleComponent],
    target: u32,
) -> Result<Vec<ComponentOrder>, BundleConfigError> {
    for c in components {
        if c.quantity_required == 0 {
            return Err(BundleConfigError::ZeroQuantityRequired {
                component_id: c.component_id.clone(),
            });
        }
    }

    Ok(components
        .iter()
        .map(|c| {
            let needed = (target as u64) * (c.quantity_required as u64);
            let shortfall = needed.saturating_sub(c.current_stock as u64);
            ComponentOrder {
                component_id: c.component_id.clone(),
                required_order_qty: shortfall.min(u32::MAX as u64) as u32,
            }
        })
        .collect())
}
