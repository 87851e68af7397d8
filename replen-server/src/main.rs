//! Reorder-review CLI host.
//!
//! Loads the inventory, sales, and vendor CSVs, runs the recommendation
//! pipeline, and prints a JSON report. Optionally writes the suggested
//! purchase order as CSV.
//!
//! Usage:
//!   replen --products products.csv [--components bundle_components.csv]
//!          [--sales sales.csv] [--vendors vendor_orders.csv]
//!          [--as-of 2025-06-15] [--top N] [--actionable]
//!          [--po purchase_order.csv]

use std::collections::HashMap;
use std::env;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use replen_core::config::EngineConfig;
use replen_pipeline::export;
use replen_pipeline::loaders;
use replen_pipeline::pipelines::reorder_review::{
    run_reorder_review, ReorderReviewPipeline, ReviewProviders,
};
use replen_pipeline::providers::{InMemoryInventory, InMemorySalesHistory, InMemoryVendorHistory};
use replen_pipeline::types::{Recommendation, ReorderQuery, SkuFailure};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson {
    generated_at: String,
    request_id: String,
    as_of: NaiveDate,
    pipeline_ms: u128,
    recommendations: Vec<Recommendation>,
    failed: Vec<SkuFailure>,
    summary: SummaryJson,
}

#[derive(Serialize)]
struct SummaryJson {
    products_reviewed: usize,
    needing_action: usize,
    high_priority: usize,
    failed: usize,
    total_suggested_units: u64,
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

struct Args {
    products_path: String,
    components_path: Option<String>,
    sales_path: Option<String>,
    vendors_path: Option<String>,
    as_of: Option<NaiveDate>,
    top: Option<usize>,
    actionable_only: bool,
    po_path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        products_path: String::new(),
        components_path: None,
        sales_path: None,
        vendors_path: None,
        as_of: None,
        top: None,
        actionable_only: false,
        po_path: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag.as_str() {
            "--products" => args.products_path = value_for("--products")?,
            "--components" => args.components_path = Some(value_for("--components")?),
            "--sales" => args.sales_path = Some(value_for("--sales")?),
            "--vendors" => args.vendors_path = Some(value_for("--vendors")?),
            "--as-of" => {
                let raw = value_for("--as-of")?;
                let parsed = raw
                    .parse::<NaiveDate>()
                    .map_err(|e| format!("bad --as-of date '{raw}': {e}"))?;
                args.as_of = Some(parsed);
            }
            "--top" => {
                let raw = value_for("--top")?;
                let parsed = raw
                    .parse::<usize>()
                    .map_err(|e| format!("bad --top value '{raw}': {e}"))?;
                args.top = Some(parsed);
            }
            "--actionable" => args.actionable_only = true,
            "--po" => args.po_path = Some(value_for("--po")?),
            other => return Err(format!("unknown flag: {other}")),
        }
    }

    if args.products_path.is_empty() {
        return Err("--products <file> is required".to_string());
    }
    Ok(args)
}

fn usage() -> &'static str {
    "usage: replen --products <file> [--components <file>] [--sales <file>] \
     [--vendors <file>] [--as-of YYYY-MM-DD] [--top N] [--actionable] [--po <file>]"
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{}", usage());
            process::exit(2);
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), String> {
    let products = loaders::load_products_file(&args.products_path)?;
    let components = match &args.components_path {
        Some(path) => loaders::load_bundle_components_file(path)?,
        None => Vec::new(),
    };
    let snapshots = loaders::assemble_snapshots(products, components);
    log::info!("loaded {} products", snapshots.len());

    let sales = match &args.sales_path {
        Some(path) => loaders::sales_by_product(loaders::load_sales_file(path)?),
        None => HashMap::new(),
    };
    let vendor_orders = match &args.vendors_path {
        Some(path) => loaders::vendor_order_records(loaders::load_vendor_orders_file(path)?),
        None => Vec::new(),
    };

    let as_of = args
        .as_of
        .unwrap_or_else(|| Utc::now().date_naive());

    let providers = ReviewProviders {
        inventory: Arc::new(InMemoryInventory::new(snapshots)),
        sales: Arc::new(InMemorySalesHistory::new(sales)),
        vendors: Arc::new(InMemoryVendorHistory::new(vendor_orders)),
    };
    let mut builder =
        ReorderReviewPipeline::builder(providers, EngineConfig::default(), as_of);
    if let Some(top) = args.top {
        builder = builder.max_results(top);
    }
    let pipeline = builder.build();

    let query = ReorderQuery {
        request_id: format!("cli-{}", Utc::now().timestamp()),
        as_of: Some(as_of),
        categories: None,
        actionable_only: args.actionable_only,
    };

    let started = Instant::now();
    let report = run_reorder_review(&pipeline, query)
        .await
        .map_err(|e| e.to_string())?;
    let pipeline_ms = started.elapsed().as_millis();

    if let Some(po_path) = &args.po_path {
        let lines = export::purchase_order_lines(&report.recommendations, as_of);
        let file = std::fs::File::create(po_path)
            .map_err(|e| format!("failed to create '{po_path}': {e}"))?;
        export::write_purchase_order_csv(file, &lines)?;
        log::info!("wrote {} purchase order lines to {}", lines.len(), po_path);
    }

    let summary = SummaryJson {
        products_reviewed: report.recommendations.len() + report.failed.len(),
        needing_action: report
            .recommendations
            .iter()
            .filter(|r| r.needs_action())
            .count(),
        high_priority: report
            .recommendations
            .iter()
            .filter(|r| r.priority == replen_pipeline::types::Priority::High)
            .count(),
        failed: report.failed.len(),
        total_suggested_units: report
            .recommendations
            .iter()
            .map(|r| r.order_suggestion.qty as u64)
            .sum(),
    };

    let output = ReportJson {
        generated_at: Utc::now().to_rfc3339(),
        request_id: report.request_id,
        as_of,
        pipeline_ms,
        recommendations: report.recommendations,
        failed: report.failed,
        summary,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("failed to serialize report: {e}"))?;
    println!("{json}");
    Ok(())
}
