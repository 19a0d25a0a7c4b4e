//! Headline metrics for a store's history

use crate::data::StoreHistory;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use store_math::{max, mean};

/// Figures shown next to a store's sales chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoreSummary {
    pub store_id: u32,
    pub average_daily_sales: f64,
    pub maximum_daily_sales: f64,
    pub data_points: usize,
}

impl StoreSummary {
    /// Summarize a store history
    pub fn from_history(history: &StoreHistory) -> Result<Self> {
        Ok(Self {
            store_id: history.store_id(),
            average_daily_sales: mean(history.sales())?,
            maximum_daily_sales: max(history.sales())?,
            data_points: history.len(),
        })
    }
}

impl fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Store {} Summary:", self.store_id)?;
        writeln!(f, "  Average Daily Sales: {:.0}", self.average_daily_sales.trunc())?;
        writeln!(f, "  Maximum Daily Sales: {:.0}", self.maximum_daily_sales.trunc())?;
        writeln!(f, "  Data Points:         {}", self.data_points)?;
        Ok(())
    }
}
