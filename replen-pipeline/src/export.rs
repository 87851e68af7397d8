//! Purchase-order export.
//!
//! Renders a recommendation batch into purchase-order line items and CSV.
//! Pure formatting: quantities and dates come straight off the
//! recommendations, with the delivery date projected as the as-of date
//! plus the SKU's lead time.

use std::io::Write;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::types::Recommendation;

/// One purchase-order line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseOrderLine {
    pub sku: String,
    pub current_qty: u32,
    pub rop: u32,
    pub recommended_order_qty: u32,
    pub expected_delivery_date: NaiveDate,
}

/// Lines for every SKU with a non-zero suggested order, in ranked order.
pub fn purchase_order_lines(
    recommendations: &[Recommendation],
    as_of: NaiveDate,
) -> Vec<PurchaseOrderLine> {
    recommendations
        .iter()
        .filter(|r| r.order_suggestion.qty > 0)
        .map(|r| PurchaseOrderLine {
            sku: r.sku.clone(),
            current_qty: r.current_qty,
            rop: r.metrics.rop,
            recommended_order_qty: r.order_suggestion.qty,
            expected_delivery_date: as_of
                + Duration::days(r.lead_time_days.max(0.0).ceil() as i64),
        })
        .collect()
}

/// Write lines as CSV with a header row.
pub fn write_purchase_order_csv<W: Write>(
    writer: W,
    lines: &[PurchaseOrderLine],
) -> Result<(), String> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for line in lines {
        csv_writer
            .serialize(line)
            .map_err(|e| format!("purchase order CSV write failed: {e}"))?;
    }
    csv_writer
        .flush()
        .map_err(|e| format!("purchase order CSV flush failed: {e}"))
}

/// CSV as a string, for hosts that hand the document on rather than
/// writing a file.
pub fn purchase_order_csv(lines: &[PurchaseOrderLine]) -> Result<String, String> {
    let mut buffer = Vec::new();
    write_purchase_order_csv(&mut buffer, lines)?;
    String::from_utf8(buffer).map_err(|e| format!("purchase order CSV was not UTF-8: {e}"))
}
