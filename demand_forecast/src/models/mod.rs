//! Forecasting models and the normalized forecast shape they produce

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

pub mod prophet;
pub mod sarima;
pub mod store;

pub use prophet::ProphetModel;
pub use sarima::SarimaModel;
pub use store::ModelStore;

/// Longest horizon the core will project, in days
pub const MAX_HORIZON: usize = 365;

/// Which forecasting backend a model handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Seasonal autoregressive integrated moving average
    Sarima,
    /// Additive trend plus Fourier seasonality
    Prophet,
}

impl ModelKind {
    /// Lowercase identifier used in file names and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Sarima => "sarima",
            ModelKind::Prophet => "prophet",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sarima" => Ok(ModelKind::Sarima),
            "prophet" => Ok(ModelKind::Prophet),
            other => Err(ForecastError::InvalidParameter(format!(
                "model='{}' is not a known model kind; use 'sarima' or 'prophet'",
                other
            ))),
        }
    }
}

/// Number of future days to forecast, validated to `1..=365`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Horizon(usize);

impl Horizon {
    /// Validate a horizon given as a whole number of days
    pub fn new(days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(ForecastError::InvalidHorizon {
                horizon: days.to_string(),
                reason: "must be at least 1 day".to_string(),
            });
        }
        if days as u64 > MAX_HORIZON as u64 {
            return Err(ForecastError::InvalidHorizon {
                horizon: days.to_string(),
                reason: format!("must not exceed {} days", MAX_HORIZON),
            });
        }

        Ok(Self(days as usize))
    }

    /// Number of days
    pub fn days(&self) -> usize {
        self.0
    }
}

impl TryFrom<f64> for Horizon {
    type Error = ForecastError;

    fn try_from(days: f64) -> Result<Self> {
        if !days.is_finite() || days.fract() != 0.0 {
            return Err(ForecastError::InvalidHorizon {
                horizon: days.to_string(),
                reason: "must be a whole number of days".to_string(),
            });
        }
        if days < i64::MIN as f64 || days > i64::MAX as f64 {
            return Err(ForecastError::InvalidHorizon {
                horizon: days.to_string(),
                reason: format!("must not exceed {} days", MAX_HORIZON),
            });
        }

        Horizon::new(days as i64)
    }
}

impl TryFrom<i64> for Horizon {
    type Error = ForecastError;

    fn try_from(days: i64) -> Result<Self> {
        Horizon::new(days)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One forecast day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Calendar day being forecast
    pub date: NaiveDate,
    /// Point estimate
    pub predicted: f64,
    /// Lower confidence bound
    pub lower_bound: f64,
    /// Upper confidence bound
    pub upper_bound: f64,
}

/// Forecast rows in date order; the one shape every backend produces
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Wrap rows as a table
    pub fn new(rows: Vec<ForecastRow>) -> Self {
        Self { rows }
    }

    /// Build a table of consecutive days starting at `start` from point
    /// estimates and `(lower, upper)` intervals
    pub fn from_daily(
        start: NaiveDate,
        predicted: &[f64],
        intervals: &[(f64, f64)],
    ) -> Result<Self> {
        if predicted.len() != intervals.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Values length ({}) doesn't match intervals length ({})",
                predicted.len(),
                intervals.len()
            )));
        }

        let rows = predicted
            .iter()
            .zip(intervals.iter())
            .enumerate()
            .map(|(i, (&value, &(lower, upper)))| {
                let date = start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                    ForecastError::InvalidParameter(format!(
                        "Date {} + {} days is out of range",
                        start, i
                    ))
                })?;
                Ok(ForecastRow {
                    date,
                    predicted: value,
                    lower_bound: lower,
                    upper_bound: upper,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    /// Get the rows
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Consume the table, returning its rows
    pub fn into_rows(self) -> Vec<ForecastRow> {
        self.rows
    }

    /// Number of forecast days
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Forecast dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Point estimates
    pub fn predicted(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted).collect()
    }

    /// Lower bounds
    pub fn lower_bounds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.lower_bound).collect()
    }

    /// Upper bounds
    pub fn upper_bounds(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.upper_bound).collect()
    }

    /// New table with `f` applied to every value column; dates are kept
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            rows: self
                .rows
                .iter()
                .map(|r| ForecastRow {
                    date: r.date,
                    predicted: f(r.predicted),
                    lower_bound: f(r.lower_bound),
                    upper_bound: f(r.upper_bound),
                })
                .collect(),
        }
    }
}

/// Capability shared by every fitted backend: project a horizon past the
/// last observed day into a [`ForecastTable`].
pub trait HorizonProjector: Debug {
    /// Backend this handle belongs to
    fn kind(&self) -> ModelKind;

    /// Forecast `horizon` consecutive days starting the day after
    /// `last_known_date`
    fn project(&self, horizon: Horizon, last_known_date: NaiveDate) -> Result<ForecastTable>;
}

/// A fitted, read-only model handle of either backend
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastModel {
    /// Seasonal ARIMA handle
    Sarima(SarimaModel),
    /// Trend/seasonality handle
    Prophet(ProphetModel),
}

impl ForecastModel {
    /// Backend of the wrapped handle
    pub fn kind(&self) -> ModelKind {
        match self {
            ForecastModel::Sarima(_) => ModelKind::Sarima,
            ForecastModel::Prophet(_) => ModelKind::Prophet,
        }
    }
}

impl From<SarimaModel> for ForecastModel {
    fn from(model: SarimaModel) -> Self {
        ForecastModel::Sarima(model)
    }
}

impl From<ProphetModel> for ForecastModel {
    fn from(model: ProphetModel) -> Self {
        ForecastModel::Prophet(model)
    }
}
