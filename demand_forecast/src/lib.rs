//! # Demand Forecast
//!
//! Forecast orchestration for a retail demand dashboard: load daily per-store
//! sales, load a pre-fit forecasting model, project a forecast with
//! confidence bounds, explore what-if scenarios and segment stores.
//!
//! ## Features
//!
//! - Sales dataset loading and per-store histories (`data`)
//! - Two interchangeable fitted backends behind one projection interface:
//!   step-count seasonal ARIMA and date-scaffold trend/seasonality (`models`)
//! - Forecast dispatch with a normalized output table (`engine`)
//! - Holiday uplift and other deterministic scenarios (`scenario`)
//! - Store segmentation with seeded k-means (`segmentation`)
//! - CSV export with a fixed column contract (`export`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::data::DataLoader;
//! use demand_forecast::engine::forecast_store;
//! use demand_forecast::models::{Horizon, ModelKind, ModelStore};
//! use demand_forecast::scenario::apply_holiday_uplift;
//!
//! # fn main() -> demand_forecast::Result<()> {
//! // Load data
//! let dataset = DataLoader::from_csv("data/processed/rossmann_features.csv")?;
//! let history = dataset.store_history(1)?;
//!
//! // Load a fitted model
//! let model = ModelStore::new("models").load(ModelKind::Sarima)?;
//!
//! // Forecast two weeks and simulate a 10% holiday spike
//! let forecast = forecast_store(&history, ModelKind::Sarima, &model, Horizon::new(14)?)?;
//! let holiday = apply_holiday_uplift(&forecast, 10.0)?;
//! # let _ = holiday;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod scenario;
pub mod segmentation;
pub mod summary;

// Re-export commonly used types
pub use crate::config::DashboardConfig;
pub use crate::data::{DataLoader, SalesDataset, SalesRecord, StoreHistory};
pub use crate::engine::{forecast_store, generate_forecast};
pub use crate::error::{ForecastError, ModelFailure, Result};
pub use crate::models::{
    ForecastModel, ForecastRow, ForecastTable, Horizon, HorizonProjector, ModelKind, ModelStore,
};
pub use crate::scenario::{apply_holiday_uplift, HolidayUplift, ScenarioTransform};
pub use crate::segmentation::{cluster_stores, StoreSegmentation};
pub use crate::summary::StoreSummary;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
