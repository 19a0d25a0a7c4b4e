//! # Store Forecast Workspace
//!
//! `store_forecast_workspace` wires the demand forecast core into one
//! dashboard session: a loaded sales dataset, a model store, and the
//! operations a user triggers (pick a store, forecast, explore a holiday
//! scenario, export, segment).
//!
//! ## Example
//!
//! ```no_run
//! use store_forecast_workspace::{Dashboard, DashboardConfig, ModelKind};
//!
//! # fn main() -> demand_forecast::Result<()> {
//! let dashboard = Dashboard::open(DashboardConfig::default())?;
//! let forecast = dashboard.forecast(1, ModelKind::Prophet, 14)?;
//! let holiday = dashboard.holiday_scenario(&forecast, 15.0)?;
//! println!("{}", dashboard.export_csv(&holiday)?);
//! # Ok(())
//! # }
//! ```

pub use demand_forecast;
pub use store_math;

pub use demand_forecast::{
    DashboardConfig, ForecastError, ForecastTable, ModelKind, Result, SalesDataset,
    StoreSegmentation, StoreSummary,
};

use demand_forecast::export::to_csv_string;
use demand_forecast::segmentation::cluster_stores_with_seed;
use demand_forecast::{
    apply_holiday_uplift, forecast_store, DataLoader, Horizon, ModelStore, StoreHistory,
};
use tracing::info;

/// One dashboard session over a loaded dataset.
///
/// Models are loaded per forecast request, so a session never holds
/// mutable model state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    dataset: SalesDataset,
    models: ModelStore,
}

impl Dashboard {
    /// Load the dataset named in `config`
    pub fn open(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        let dataset = DataLoader::from_csv(&config.data_path)?;
        Ok(Self::with_dataset(config, dataset))
    }

    /// Build a session around an already loaded dataset
    pub fn with_dataset(config: DashboardConfig, dataset: SalesDataset) -> Self {
        let models = ModelStore::new(config.model_dir.clone());
        info!(
            stores = dataset.store_ids().len(),
            model_dir = %config.model_dir.display(),
            "Dashboard session opened"
        );
        Self {
            config,
            dataset,
            models,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Loaded dataset
    pub fn dataset(&self) -> &SalesDataset {
        &self.dataset
    }

    /// Stores the user can pick, ascending
    pub fn store_ids(&self) -> Vec<u32> {
        self.dataset.store_ids()
    }

    /// Date-ordered history of one store
    pub fn store_history(&self, store_id: u32) -> Result<StoreHistory> {
        self.dataset.store_history(store_id)
    }

    /// Headline metrics of one store
    pub fn store_summary(&self, store_id: u32) -> Result<StoreSummary> {
        StoreSummary::from_history(&self.store_history(store_id)?)
    }

    /// Forecast `horizon` days after the store's last observation
    pub fn forecast(&self, store_id: u32, kind: ModelKind, horizon: i64) -> Result<ForecastTable> {
        let horizon = Horizon::new(horizon)?;
        let history = self.store_history(store_id)?;
        let model = self.models.load(kind)?;
        forecast_store(&history, kind, &model, horizon)
    }

    /// Holiday what-if on top of a base forecast
    pub fn holiday_scenario(&self, base: &ForecastTable, uplift_pct: f64) -> Result<ForecastTable> {
        apply_holiday_uplift(base, uplift_pct)
    }

    /// CSV rendering for download
    pub fn export_csv(&self, table: &ForecastTable) -> Result<String> {
        to_csv_string(table)
    }

    /// Segment all stores with the configured cluster count and seed
    pub fn segment_stores(&self) -> Result<StoreSegmentation> {
        cluster_stores_with_seed(
            &self.dataset,
            self.config.cluster_count,
            self.config.cluster_seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demand_forecast::SalesRecord;
    use chrono::NaiveDate;

    fn dashboard() -> Dashboard {
        let start = NaiveDate::from_ymd_opt(2015, 7, 1).unwrap();
        let records = (1..=3u32)
            .flat_map(|store| {
                start.iter_days().take(5).enumerate().map(move |(i, date)| SalesRecord {
                    store_id: store,
                    date,
                    sales: 1000.0 * store as f64 + i as f64,
                    promo: i % 2 == 0,
                })
            })
            .collect();
        Dashboard::with_dataset(
            DashboardConfig::default(),
            SalesDataset::new(records).unwrap(),
        )
    }

    #[test]
    fn test_store_ids_and_summary() {
        let dashboard = dashboard();
        assert_eq!(dashboard.store_ids(), vec![1, 2, 3]);

        let summary = dashboard.store_summary(2).unwrap();
        assert_eq!(summary.data_points, 5);
        assert_eq!(summary.maximum_daily_sales, 2004.0);
    }

    #[test]
    fn test_unknown_store_is_data_error() {
        assert!(matches!(
            dashboard().store_summary(99),
            Err(ForecastError::DataLoad(_))
        ));
    }

    #[test]
    fn test_invalid_horizon_checked_before_model_load() {
        // No model files exist; the horizon must fail first
        assert!(matches!(
            dashboard().forecast(1, ModelKind::Sarima, 0),
            Err(ForecastError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn test_segment_stores_with_defaults() {
        let segmentation = dashboard().segment_stores().unwrap();
        assert_eq!(segmentation.assignments().len(), 3);
        assert_eq!(segmentation.k(), 3);
    }
}
