//! Daily per-store sales data handling

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Days since 1970-01-01, the polars `Date` representation
pub(crate) fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

/// Inverse of [`epoch_days`]
pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_FROM_CE)?)
}

/// One row of the source dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Store identifier, starting at 1
    pub store_id: u32,
    /// Calendar day
    pub date: NaiveDate,
    /// Sales for the day
    pub sales: f64,
    /// Whether a promotion ran that day
    pub promo: bool,
}

/// Validated daily sales for every store
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
}

/// Sales of one store, strictly increasing by date
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHistory {
    store_id: u32,
    dates: Vec<NaiveDate>,
    sales: Vec<f64>,
}

/// Data loader for the sales dataset
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Required dataset columns
    pub const REQUIRED_COLUMNS: [&'static str; 4] = ["Store", "Date", "Sales", "Promo"];

    /// Load the sales dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesDataset> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::DataLoad(format!("cannot open {}: {}", path.display(), e))
        })?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()
            .map_err(|e| {
                ForecastError::DataLoad(format!("cannot parse {}: {}", path.display(), e))
            })?;

        let dataset = Self::from_dataframe(df)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            stores = dataset.store_ids().len(),
            "Sales dataset loaded"
        );
        Ok(dataset)
    }

    /// Create the sales dataset from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<SalesDataset> {
        for name in Self::REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(ForecastError::DataLoad(format!(
                    "missing required column '{}'",
                    name
                )));
            }
        }

        let stores = Self::column_as_i64(&df, "Store")?;
        let dates = Self::column_as_dates(&df, "Date")?;
        let sales = Self::column_as_f64(&df, "Sales")?;
        let promos = Self::column_as_i64(&df, "Promo")?;

        let records = stores
            .into_iter()
            .zip(dates)
            .zip(sales.into_iter().zip(promos))
            .enumerate()
            .map(|(row, ((store, date), (sales, promo)))| {
                let store_id = u32::try_from(store).ok().filter(|id| *id >= 1).ok_or_else(|| {
                    ForecastError::DataLoad(format!(
                        "row {}: Store={} is not a positive store id",
                        row, store
                    ))
                })?;
                let promo = match promo {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(ForecastError::DataLoad(format!(
                            "row {}: Promo={} must be 0 or 1",
                            row, other
                        )))
                    }
                };
                Ok(SalesRecord {
                    store_id,
                    date,
                    sales,
                    promo,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        SalesDataset::new(records)
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        df.column(name)
            .map_err(|e| ForecastError::DataLoad(format!("column '{}' not found: {}", name, e)))
    }

    fn no_nulls<T>(name: &str, values: Vec<Option<T>>) -> Result<Vec<T>> {
        values
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    ForecastError::DataLoad(format!("row {}: column '{}' is empty", row, name))
                })
            })
            .collect()
    }

    /// Helper method to get a column as f64 values
    fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let col = Self::column(df, name)?.cast(&DataType::Float64).map_err(|e| {
            ForecastError::DataLoad(format!("column '{}' cannot be converted to f64: {}", name, e))
        })?;
        Self::no_nulls(name, col.f64()?.into_iter().collect())
    }

    /// Helper method to get a column as i64 values
    fn column_as_i64(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
        let col = Self::column(df, name)?.cast(&DataType::Int64).map_err(|e| {
            ForecastError::DataLoad(format!("column '{}' cannot be converted to i64: {}", name, e))
        })?;
        Self::no_nulls(name, col.i64()?.into_iter().collect())
    }

    /// Helper method to get a column as calendar dates
    fn column_as_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
        let col = Self::column(df, name)?;

        match col.dtype() {
            DataType::Utf8 => {
                let values = Self::no_nulls(
                    name,
                    col.utf8()?.into_iter().map(|v| v.map(str::to_string)).collect(),
                )?;
                values
                    .iter()
                    .enumerate()
                    .map(|(row, s)| parse_date(s).map_err(|e| {
                        ForecastError::DataLoad(format!("row {}: column '{}': {}", row, name, e))
                    }))
                    .collect()
            }
            DataType::Date | DataType::Datetime(_, _) => {
                let days = col.cast(&DataType::Date)?.cast(&DataType::Int32)?;
                let days = Self::no_nulls(name, days.i32()?.into_iter().collect())?;
                days.into_iter()
                    .enumerate()
                    .map(|(row, d)| {
                        date_from_epoch_days(d).ok_or_else(|| {
                            ForecastError::DataLoad(format!(
                                "row {}: column '{}' holds out-of-range day {}",
                                row, name, d
                            ))
                        })
                    })
                    .collect()
            }
            other => Err(ForecastError::DataLoad(format!(
                "column '{}' has type {} and cannot be read as dates",
                name, other
            ))),
        }
    }
}

/// Parse an ISO calendar date, accepting a trailing time of day
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| ForecastError::DataLoad(format!("'{}' is not an ISO date", s)))
}

impl SalesDataset {
    /// Validate and wrap records.
    ///
    /// Sales must be finite and non-negative, store ids at least 1, and each
    /// store may have at most one record per date.
    pub fn new(records: Vec<SalesRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            if record.store_id == 0 {
                return Err(ForecastError::DataLoad(format!(
                    "row {}: store_id must be at least 1",
                    row
                )));
            }
            if !record.sales.is_finite() || record.sales < 0.0 {
                return Err(ForecastError::DataLoad(format!(
                    "row {}: sales={} for store {} must be a non-negative number",
                    row, record.sales, record.store_id
                )));
            }
            if !seen.insert((record.store_id, record.date)) {
                return Err(ForecastError::DataLoad(format!(
                    "row {}: duplicate record for store {} on {}",
                    row, record.store_id, record.date
                )));
            }
        }

        Ok(Self { records })
    }

    /// Get the records in source order
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct store ids, ascending
    pub fn store_ids(&self) -> Vec<u32> {
        self.records
            .iter()
            .map(|r| r.store_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Date-ordered sales history of one store
    pub fn store_history(&self, store_id: u32) -> Result<StoreHistory> {
        let rows = filter_store(&self.records, store_id);
        let rows = sort_by_date(rows);
        project(store_id, &rows)
    }
}

/// Records belonging to `store_id`
pub fn filter_store(records: &[SalesRecord], store_id: u32) -> Vec<&SalesRecord> {
    records.iter().filter(|r| r.store_id == store_id).collect()
}

/// Order records by date
pub fn sort_by_date(mut rows: Vec<&SalesRecord>) -> Vec<&SalesRecord> {
    rows.sort_by_key(|r| r.date);
    rows
}

/// Keep the date and sales columns of already filtered, sorted rows
pub fn project(store_id: u32, rows: &[&SalesRecord]) -> Result<StoreHistory> {
    if rows.is_empty() {
        return Err(ForecastError::DataLoad(format!(
            "no records for store_id={}; choose a different store",
            store_id
        )));
    }

    Ok(StoreHistory {
        store_id,
        dates: rows.iter().map(|r| r.date).collect(),
        sales: rows.iter().map(|r| r.sales).collect(),
    })
}

impl StoreHistory {
    /// Build a history from parallel date and sales vectors
    pub fn new(store_id: u32, dates: Vec<NaiveDate>, sales: Vec<f64>) -> Result<Self> {
        if dates.is_empty() {
            return Err(ForecastError::DataLoad(format!(
                "store {} has an empty history",
                store_id
            )));
        }
        if dates.len() != sales.len() {
            return Err(ForecastError::DataLoad(format!(
                "store {}: {} dates but {} sales values",
                store_id,
                dates.len(),
                sales.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataLoad(format!(
                "store {}: dates must be strictly increasing",
                store_id
            )));
        }

        Ok(Self {
            store_id,
            dates,
            sales,
        })
    }

    /// Store this history belongs to
    pub fn store_id(&self) -> u32 {
        self.store_id
    }

    /// Observation dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Daily sales
    pub fn sales(&self) -> &[f64] {
        &self.sales
    }

    /// Last observed date; forecasts start the day after
    pub fn last_date(&self) -> NaiveDate {
        // Construction guarantees at least one row
        self.dates[self.dates.len() - 1]
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the history has no observations
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
