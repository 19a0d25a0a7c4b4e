//! What-if adjustments applied to a finished forecast
//!
//! A scenario never touches the base forecast: it returns a new table, so the
//! same forecast can be explored under many settings without recomputing it.

use crate::error::{ForecastError, Result};
use crate::models::ForecastTable;
use tracing::debug;

/// Deterministic transformation of a forecast table
pub trait ScenarioTransform {
    /// Produce the adjusted table
    fn apply(&self, table: &ForecastTable) -> Result<ForecastTable>;
}

/// Uniform percentage increase modeling a holiday demand spike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HolidayUplift {
    uplift_pct: f64,
}

impl HolidayUplift {
    /// Create an uplift of `uplift_pct` percent; zero is a no-op
    pub fn new(uplift_pct: f64) -> Result<Self> {
        if !uplift_pct.is_finite() || uplift_pct < 0.0 {
            return Err(ForecastError::InvalidUplift { uplift_pct });
        }
        Ok(Self { uplift_pct })
    }

    /// Percentage this uplift applies
    pub fn uplift_pct(&self) -> f64 {
        self.uplift_pct
    }

    /// Multiplier applied to every value, `1 + uplift_pct / 100`
    pub fn factor(&self) -> f64 {
        1.0 + self.uplift_pct / 100.0
    }
}

impl ScenarioTransform for HolidayUplift {
    fn apply(&self, table: &ForecastTable) -> Result<ForecastTable> {
        let factor = self.factor();
        debug!(uplift_pct = self.uplift_pct, rows = table.len(), "Applying holiday uplift");
        Ok(table.map_values(|v| v * factor))
    }
}

/// Scale predicted, lower and upper values by `1 + uplift_pct / 100`
pub fn apply_holiday_uplift(table: &ForecastTable, uplift_pct: f64) -> Result<ForecastTable> {
    HolidayUplift::new(uplift_pct)?.apply(table)
}
