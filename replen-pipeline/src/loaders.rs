//! CSV data loaders.
//!
//! Parses the four flat files the CLI host feeds the engine: products,
//! bundle components, sales history, and vendor orders. Optional fields
//! (last sale date, vendor id, delivered date) are blank cells; the
//! custom deserializers below turn those into `None` instead of a parse
//! error. Every parse failure carries its line number.
//!
//! Expected columns:
//! - products.csv: id, sku, category, current_qty, avg_daily_sales,
//!   max_daily_sales, lead_time_days, max_lead_days, cost_per_unit,
//!   selling_price, last_sale_date, vendor_id
//! - bundle_components.csv: bundle_id, component_id, quantity_required,
//!   current_stock
//! - sales.csv: product_id, date, qty
//! - vendor_orders.csv: vendor_id, sku, order_date, expected_date,
//!   delivered_date, unit_cost

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use replen_core::bundle::BundleComponent;
use replen_core::demand::SaleRecord;
use replen_core::types::{ProductKind, ProductSnapshot};
use replen_core::vendor::VendorOrderRecord;

/// A product row as it appears in the CSV, before bundle resolution.
#[derive(Clone, Debug, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub sku: String,
    pub category: String,
    pub current_qty: u32,
    pub avg_daily_sales: f64,
    pub max_daily_sales: f64,
    pub lead_time_days: f64,
    pub max_lead_days: f64,
    pub cost_per_unit: f64,
    pub selling_price: f64,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub last_sale_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub vendor_id: Option<String>,
}

/// One bundle bill-of-materials row.
#[derive(Clone, Debug, Deserialize)]
pub struct BundleComponentRecord {
    pub bundle_id: String,
    pub component_id: String,
    pub quantity_required: u32,
    pub current_stock: u32,
}

/// One sales-history row.
#[derive(Clone, Debug, Deserialize)]
pub struct SaleRow {
    pub product_id: String,
    pub date: NaiveDate,
    pub qty: f64,
}

/// One vendor purchase-order row.
#[derive(Clone, Debug, Deserialize)]
pub struct VendorOrderRow {
    pub vendor_id: String,
    pub sku: String,
    pub order_date: NaiveDate,
    pub expected_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub delivered_date: Option<NaiveDate>,
    pub unit_cost: f64,
}

fn read_csv<R: Read, T: for<'de> Deserialize<'de>>(
    reader: R,
    what: &str,
) -> Result<Vec<T>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let row: T =
            result.map_err(|e| format!("{} parse error at line {}: {}", what, line_num + 2, e))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_products<R: Read>(reader: R) -> Result<Vec<ProductRecord>, String> {
    read_csv(reader, "products CSV")
}

pub fn load_bundle_components<R: Read>(reader: R) -> Result<Vec<BundleComponentRecord>, String> {
    read_csv(reader, "bundle components CSV")
}

pub fn load_sales<R: Read>(reader: R) -> Result<Vec<SaleRow>, String> {
    read_csv(reader, "sales CSV")
}

pub fn load_vendor_orders<R: Read>(reader: R) -> Result<Vec<VendorOrderRow>, String> {
    read_csv(reader, "vendor orders CSV")
}

pub fn load_products_file(path: &str) -> Result<Vec<ProductRecord>, String> {
    load_products(open(path)?)
}

pub fn load_bundle_components_file(path: &str) -> Result<Vec<BundleComponentRecord>, String> {
    load_bundle_components(open(path)?)
}

pub fn load_sales_file(path: &str) -> Result<Vec<SaleRow>, String> {
    load_sales(open(path)?)
}

pub fn load_vendor_orders_file(path: &str) -> Result<Vec<VendorOrderRow>, String> {
    load_vendor_orders(open(path)?)
}

fn open(path: &str) -> Result<std::fs::File, String> {
    std::fs::File::open(path).map_err(|e| format!("failed to open '{}': {}", path, e))
}

/// Join product rows with their bundle components into snapshots.
///
/// This is the single place `ProductKind` is decided: a product with
/// component rows becomes `Bundle`, everything else is `Simple`. Call
/// sites downstream dispatch on the variant and never re-detect.
pub fn assemble_snapshots(
    products: Vec<ProductRecord>,
    components: Vec<BundleComponentRecord>,
) -> Vec<ProductSnapshot> {
    let mut by_bundle: HashMap<String, Vec<BundleComponent>> = HashMap::new();
    for c in components {
        by_bundle
            .entry(c.bundle_id)
            .or_default()
            .push(BundleComponent {
                component_id: c.component_id,
                quantity_required: c.quantity_required,
                current_stock: c.current_stock,
            });
    }

    products
        .into_iter()
        .map(|p| {
            let kind = match by_bundle.remove(&p.id) {
                Some(components) if !components.is_empty() => ProductKind::Bundle { components },
                _ => ProductKind::Simple,
            };
            ProductSnapshot {
                id: p.id,
                sku: p.sku,
                category: p.category,
                current_qty: p.current_qty,
                avg_daily_sales: p.avg_daily_sales,
                max_daily_sales: p.max_daily_sales,
                lead_time_days: p.lead_time_days,
                max_lead_days: p.max_lead_days,
                cost_per_unit: p.cost_per_unit,
                selling_price: p.selling_price,
                last_sale_date: p.last_sale_date,
                vendor_id: p.vendor_id,
                kind,
            }
        })
        .collect()
}

/// Group sales rows by product id, ordered by date within each product.
pub fn sales_by_product(rows: Vec<SaleRow>) -> HashMap<String, Vec<SaleRecord>> {
    let mut grouped: HashMap<String, Vec<SaleRecord>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(SaleRecord {
            date: row.date,
            qty: row.qty,
        });
    }
    for series in grouped.values_mut() {
        series.sort_by_key(|s| s.date);
    }
    grouped
}

/// Convert vendor order rows into the core record type.
pub fn vendor_order_records(rows: Vec<VendorOrderRow>) -> Vec<VendorOrderRecord> {
    rows.into_iter()
        .map(|r| VendorOrderRecord {
            vendor_id: r.vendor_id,
            sku: r.sku,
            order_date: r.order_date,
            expected_date: r.expected_date,
            delivered_date: r.delivered_date,
            unit_cost: r.unit_cost,
        })
        .collect()
}

/// Blank cell → `None`, anything else → parsed date.
fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<NaiveDate>()
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("bad date '{}': {}", trimmed, e)))
}

/// Blank cell → `None`, anything else → the string.
fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
