//! Error types for the demand_forecast crate

use std::path::PathBuf;
use thiserror::Error;

use crate::models::ModelKind;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Clustering was asked for more groups than there are stores
    #[error(
        "Insufficient data: k={k} clusters requested but only {stores} distinct stores are available; choose a smaller cluster count"
    )]
    InsufficientData { stores: usize, k: usize },

    /// Horizon outside `1..=365` or not a whole number of days
    #[error("Invalid horizon: horizon={horizon} ({reason}); choose a horizon between 1 and 365 days")]
    InvalidHorizon { horizon: String, reason: String },

    /// Negative or non-finite uplift percentage
    #[error("Invalid uplift: uplift_pct={uplift_pct} must be a finite, non-negative percentage")]
    InvalidUplift { uplift_pct: f64 },

    /// The requested model kind does not match the loaded model handle
    #[error(
        "Unsupported model operation: model={requested} was requested but the loaded handle is a {actual} model; load the matching model"
    )]
    UnsupportedModelOperation {
        requested: ModelKind,
        actual: ModelKind,
    },

    /// The backend could not project the requested horizon
    #[error("Forecast generation failed for model={model} with horizon={horizon}; reduce horizon or refit the model")]
    ForecastGeneration {
        model: ModelKind,
        horizon: usize,
        #[source]
        source: ModelFailure,
    },

    /// A persisted model could not be read or decoded
    #[error("Failed to load {kind} model from {}", path.display())]
    ModelLoad {
        kind: ModelKind,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error related to reading or validating the sales dataset
    #[error("Data error: {0}")]
    DataLoad(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV serialization
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from the statistics crate
    #[error("Math error: {0}")]
    MathError(#[from] store_math::MathError),
}

/// Failures raised by a forecasting backend itself.
///
/// These are surfaced to callers wrapped in
/// [`ForecastError::ForecastGeneration`], never reinterpreted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelFailure {
    /// The fitted state cannot produce forecasts at all
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    /// Not enough fitted history to seed the recursion
    #[error("fitted history has {available} observations, recursion needs {required}")]
    ShortHistory { required: usize, available: usize },

    /// The interval computation produced NaN or infinity
    #[error("non-finite forecast value at step {step}")]
    NonFinite { step: usize },

    /// The date scaffold does not line up with the fitted history
    #[error("invalid date scaffold: {0}")]
    Scaffold(String),

    /// The backend returned rows that break the forecast table shape
    #[error("malformed forecast output: {0}")]
    MalformedOutput(String),

    /// Error from building the prediction frame
    #[error("prediction frame error: {0}")]
    Frame(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<polars::prelude::PolarsError> for ModelFailure {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ModelFailure::Frame(err.to_string())
    }
}
