//! CSV export of forecast tables
//!
//! Downstream consumers parse this file, so the header is fixed:
//! `Date,Predicted Sales,Lower Bound,Upper Bound`, with ISO dates.

use crate::error::Result;
use crate::models::ForecastTable;
use crate::segmentation::StoreSegmentation;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Predicted Sales")]
    predicted: f64,
    #[serde(rename = "Lower Bound")]
    lower_bound: f64,
    #[serde(rename = "Upper Bound")]
    upper_bound: f64,
}

#[derive(Debug, Serialize)]
struct SegmentRow {
    store: u32,
    avg_sales: f64,
    sales_std: f64,
    promo_ratio: f64,
    cluster: usize,
}

/// Column names of the segmentation listing
pub const SEGMENT_COLUMNS: [&str; 5] = ["store", "avg_sales", "sales_std", "promo_ratio", "cluster"];

/// Exact export column names, in order
pub const EXPORT_COLUMNS: [&str; 4] = ["Date", "Predicted Sales", "Lower Bound", "Upper Bound"];

/// Write the table as CSV with a header row
pub fn write_csv<W: Write>(table: &ForecastTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if table.is_empty() {
        csv_writer.write_record(EXPORT_COLUMNS)?;
    }
    for row in table.rows() {
        csv_writer.serialize(ExportRow {
            date: row.date.format("%Y-%m-%d").to_string(),
            predicted: row.predicted,
            lower_bound: row.lower_bound,
            upper_bound: row.upper_bound,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render the table as a CSV string
pub fn to_csv_string(table: &ForecastTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the table to a CSV file
pub fn write_csv_file<P: AsRef<Path>>(table: &ForecastTable, path: P) -> Result<()> {
    let file = File::create(path)?;
    write_csv(table, file)
}

/// Write one row per store with its features and cluster label
pub fn write_segments_csv<W: Write>(segmentation: &StoreSegmentation, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if segmentation.stores().is_empty() {
        csv_writer.write_record(SEGMENT_COLUMNS)?;
    }
    for store in segmentation.stores() {
        csv_writer.serialize(SegmentRow {
            store: store.features.store_id,
            avg_sales: store.features.avg_sales,
            sales_std: store.features.sales_std,
            promo_ratio: store.features.promo_ratio,
            cluster: store.cluster,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Download name for a store's forecast
pub fn export_file_name(store_id: u32) -> String {
    format!("store_{}_forecast_with_ci.csv", store_id)
}
