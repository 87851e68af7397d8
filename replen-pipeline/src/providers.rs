//! Collaborator seams.
//!
//! The engine consumes three external data surfaces — the inventory
//! snapshot, sales history, and vendor order history — and produces into
//! one, the action queue. Each is an async trait so hosts can back them
//! with whatever wire client they have; the in-memory implementations
//! here back tests and the CLI host.

use std::collections::HashMap;

use async_trait::async_trait;

use replen_core::demand::SaleRecord;
use replen_core::types::ProductSnapshot;
use replen_core::vendor::VendorOrderRecord;

use crate::error::ProviderResult;
use crate::types::Recommendation;

/// Per-product/variant snapshot, including bundle component links.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn products(&self) -> ProviderResult<Vec<ProductSnapshot>>;
}

/// Ordered (date, qty) sales series per product. Missing history is not
/// an error: an empty series degrades the forecast to zero demand with
/// low confidence.
#[async_trait]
pub trait SalesHistoryProvider: Send + Sync {
    async fn history(&self, product_id: &str) -> ProviderResult<Vec<SaleRecord>>;
}

/// Completed/late/on-time purchase order records across vendors.
#[async_trait]
pub trait VendorHistoryProvider: Send + Sync {
    async fn orders(&self) -> ProviderResult<Vec<VendorOrderRecord>>;
}

/// Receives the selected recommendations. At-most-one-pending-per-product
/// deduplication is the receiver's contract, not the engine's.
#[async_trait]
pub trait ActionQueue: Send + Sync {
    async fn submit(&self, recommendations: &[Recommendation]) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Inventory snapshot held in memory, for tests and CSV-backed runs.
pub struct InMemoryInventory {
    products: Vec<ProductSnapshot>,
}

impl InMemoryInventory {
    pub fn new(products: Vec<ProductSnapshot>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl InventoryProvider for InMemoryInventory {
    async fn products(&self) -> ProviderResult<Vec<ProductSnapshot>> {
        Ok(self.products.clone())
    }
}

/// Sales series keyed by product id. Unknown products return an empty
/// series, matching the degrade-to-defaults contract.
pub struct InMemorySalesHistory {
    by_product: HashMap<String, Vec<SaleRecord>>,
}

impl InMemorySalesHistory {
    pub fn new(by_product: HashMap<String, Vec<SaleRecord>>) -> Self {
        Self { by_product }
    }

    pub fn empty() -> Self {
        Self {
            by_product: HashMap::new(),
        }
    }
}

#[async_trait]
impl SalesHistoryProvider for InMemorySalesHistory {
    async fn history(&self, product_id: &str) -> ProviderResult<Vec<SaleRecord>> {
        Ok(self.by_product.get(product_id).cloned().unwrap_or_default())
    }
}

/// Vendor order history held in memory.
pub struct InMemoryVendorHistory {
    orders: Vec<VendorOrderRecord>,
}

impl InMemoryVendorHistory {
    pub fn new(orders: Vec<VendorOrderRecord>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl VendorHistoryProvider for InMemoryVendorHistory {
    async fn orders(&self) -> ProviderResult<Vec<VendorOrderRecord>> {
        Ok(self.orders.clone())
    }
}

/// Action queue that only records the handoff in the log. Hosts replace
/// this with their real queue client.
pub struct LoggingActionQueue;

#[async_trait]
impl ActionQueue for LoggingActionQueue {
    async fn submit(&self, recommendations: &[Recommendation]) -> Result<(), String> {
        log::info!(
            "submitted {} recommendations to the action queue",
            recommendations.len()
        );
        Ok(())
    }
}
