//! Additive trend/seasonality handle for date-scaffold forecasting
//!
//! Unlike the step-count SARIMA backend, this model is evaluated on an
//! explicit list of dates. [`ProphetModel::make_future_dataframe`] regenerates
//! the full calendar (fitted history plus the requested future days) and
//! [`ProphetModel::predict`] returns a frame with `ds`, `yhat`, `yhat_lower`
//! and `yhat_upper` columns for every date in it.

use crate::data::{date_from_epoch_days, epoch_days};
use crate::error::{ForecastError, ModelFailure, Result};
use crate::models::sarima::normal_quantile;
use crate::models::{ForecastRow, ForecastTable, Horizon, HorizonProjector, ModelKind};
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Trend changepoint in scaled time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Changepoint {
    /// Position in scaled time (`0` is the first history day, `1` the last)
    pub t: f64,
    /// Slope adjustment applied from this point on
    pub delta: f64,
}

/// Fourier seasonal component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    /// Component name, e.g. `weekly`
    pub name: String,
    /// Cycle length in days
    pub period: f64,
    /// Number of sine/cosine pairs
    pub fourier_order: usize,
    /// Coefficients ordered `sin_1, cos_1, sin_2, cos_2, ...`
    pub beta: Vec<f64>,
}

impl Seasonality {
    fn value_at(&self, days: f64) -> f64 {
        (1..=self.fourier_order)
            .map(|n| {
                let x = 2.0 * PI * n as f64 * days / self.period;
                self.beta[2 * (n - 1)] * x.sin() + self.beta[2 * (n - 1) + 1] * x.cos()
            })
            .sum()
    }
}

fn default_interval_width() -> f64 {
    0.8
}

/// Fitted trend/seasonality model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProphetModel {
    /// Dates the model was fit on, strictly increasing
    pub history_dates: Vec<NaiveDate>,
    /// Origin of scaled time
    pub start: NaiveDate,
    /// Days per unit of scaled time
    pub t_scale: f64,
    /// Multiplier from model units back to sales
    pub y_scale: f64,
    /// Base growth rate
    pub k: f64,
    /// Base offset
    pub m: f64,
    /// Trend changepoints
    #[serde(default)]
    pub changepoints: Vec<Changepoint>,
    /// Additive seasonal components
    #[serde(default)]
    pub seasonalities: Vec<Seasonality>,
    /// Observation noise, in model units
    pub sigma_obs: f64,
    /// Trend drift per unit of scaled time past the history, in model units
    #[serde(default)]
    pub trend_sigma: f64,
    /// Coverage of the uncertainty interval
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
}

impl ProphetModel {
    /// History dates followed by `periods` consecutive days after the last one
    pub fn make_future_dataframe(
        &self,
        periods: usize,
    ) -> std::result::Result<Vec<NaiveDate>, ModelFailure> {
        let last = *self
            .history_dates
            .last()
            .ok_or_else(|| ModelFailure::Scaffold("model has no history dates".to_string()))?;

        let mut dates = self.history_dates.clone();
        for offset in 1..=periods {
            let date = last.checked_add_days(Days::new(offset as u64)).ok_or_else(|| {
                ModelFailure::Scaffold(format!("{} + {} days is out of range", last, offset))
            })?;
            dates.push(date);
        }
        Ok(dates)
    }

    /// Evaluate the model on `dates`
    pub fn predict(&self, dates: &[NaiveDate]) -> std::result::Result<DataFrame, ModelFailure> {
        self.check_state()?;

        let z = normal_quantile((1.0 + self.interval_width) / 2.0)?;
        let t_last = self.scaled_time(
            *self
                .history_dates
                .last()
                .ok_or_else(|| ModelFailure::Scaffold("model has no history dates".to_string()))?,
        );

        let mut yhat = Vec::with_capacity(dates.len());
        let mut lower = Vec::with_capacity(dates.len());
        let mut upper = Vec::with_capacity(dates.len());

        for (step, &date) in dates.iter().enumerate() {
            let t = self.scaled_time(date);
            let days = epoch_days(date) as f64;
            let seasonal: f64 = self.seasonalities.iter().map(|s| s.value_at(days)).sum();
            let value = (self.trend(t) + seasonal) * self.y_scale;

            let drift = self.trend_sigma * (t - t_last).max(0.0);
            let half_width =
                z * (self.sigma_obs.powi(2) + drift.powi(2)).sqrt() * self.y_scale.abs();

            if !value.is_finite() || !half_width.is_finite() {
                return Err(ModelFailure::NonFinite { step });
            }

            yhat.push(value);
            lower.push(value - half_width);
            upper.push(value + half_width);
        }

        let ds = Series::new(
            "ds",
            dates.iter().map(|d| epoch_days(*d)).collect::<Vec<i32>>(),
        )
        .cast(&DataType::Date)?;

        let frame = DataFrame::new(vec![
            ds,
            Series::new("yhat", yhat),
            Series::new("yhat_lower", lower),
            Series::new("yhat_upper", upper),
        ])?;

        Ok(frame)
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.t_scale
    }

    /// Piecewise-linear trend in model units
    fn trend(&self, t: f64) -> f64 {
        let (slope, offset) = self
            .changepoints
            .iter()
            .filter(|cp| cp.t <= t)
            .fold((self.k, self.m), |(k, m), cp| {
                (k + cp.delta, m - cp.t * cp.delta)
            });
        slope * t + offset
    }

    fn check_state(&self) -> std::result::Result<(), ModelFailure> {
        if self.history_dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelFailure::DegenerateFit(
                "history dates are not strictly increasing".to_string(),
            ));
        }
        if !(self.t_scale.is_finite() && self.t_scale > 0.0) {
            return Err(ModelFailure::DegenerateFit(format!(
                "time scale {} must be positive",
                self.t_scale
            )));
        }
        if !self.y_scale.is_finite() || !self.k.is_finite() || !self.m.is_finite() {
            return Err(ModelFailure::DegenerateFit(
                "trend parameters must be finite".to_string(),
            ));
        }
        if !(self.sigma_obs.is_finite() && self.sigma_obs >= 0.0)
            || !(self.trend_sigma.is_finite() && self.trend_sigma >= 0.0)
        {
            return Err(ModelFailure::DegenerateFit(format!(
                "noise scales sigma_obs={} trend_sigma={} must be finite and non-negative",
                self.sigma_obs, self.trend_sigma
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ModelFailure::DegenerateFit(format!(
                "interval width {} must lie strictly between 0 and 1",
                self.interval_width
            )));
        }
        for s in &self.seasonalities {
            if s.beta.len() != 2 * s.fourier_order || !(s.period > 0.0) {
                return Err(ModelFailure::DegenerateFit(format!(
                    "seasonality '{}' has period {} and {} coefficients for order {}",
                    s.name,
                    s.period,
                    s.beta.len(),
                    s.fourier_order
                )));
            }
        }
        Ok(())
    }

    /// Scaffold, predict, then keep the trailing `horizon` rows dated after
    /// `last_known_date`
    fn trailing_rows(
        &self,
        horizon: usize,
        last_known_date: NaiveDate,
    ) -> std::result::Result<Vec<ForecastRow>, ModelFailure> {
        let future = self.make_future_dataframe(horizon)?;
        let frame = self.predict(&future)?;

        let ds = frame.column("ds")?.cast(&DataType::Int32)?;
        let after: Vec<bool> = ds
            .i32()?
            .into_iter()
            .map(|d| d.map_or(false, |d| d > epoch_days(last_known_date)))
            .collect();
        let mask = BooleanChunked::from_slice("after_last_known", &after);
        let selected = frame.filter(&mask)?.tail(Some(horizon));

        if selected.height() != horizon {
            return Err(ModelFailure::Scaffold(format!(
                "only {} scaffold dates fall after {}, expected {}",
                selected.height(),
                last_known_date,
                horizon
            )));
        }

        let days = selected.column("ds")?.cast(&DataType::Int32)?;
        let days = days.i32()?;
        let yhat = selected.column("yhat")?.f64()?;
        let lower = selected.column("yhat_lower")?.f64()?;
        let upper = selected.column("yhat_upper")?.f64()?;

        let rows = days
            .into_iter()
            .zip(yhat.into_iter())
            .zip(lower.into_iter().zip(upper.into_iter()))
            .enumerate()
            .map(|(step, ((d, y), (lo, hi)))| match (d, y, lo, hi) {
                (Some(d), Some(y), Some(lo), Some(hi)) => {
                    let date = date_from_epoch_days(d).ok_or_else(|| {
                        ModelFailure::Frame(format!("day {} is out of range", d))
                    })?;
                    Ok(ForecastRow {
                        date,
                        predicted: y,
                        lower_bound: lo,
                        upper_bound: hi,
                    })
                }
                _ => Err(ModelFailure::NonFinite { step }),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // A history running past last_known_date leaves the tail on later days
        let expected_start = last_known_date.checked_add_days(Days::new(1));
        let first = rows.first().map(|r| r.date);
        if first != expected_start {
            let model_last = self
                .history_dates
                .last()
                .map_or_else(|| "none".to_string(), |d| d.to_string());
            return Err(ModelFailure::Scaffold(format!(
                "model history ends on {} but last_known_date={}; forecast would start on {}",
                model_last,
                last_known_date,
                first.map_or_else(|| "none".to_string(), |d| d.to_string())
            )));
        }

        Ok(rows)
    }
}

impl HorizonProjector for ProphetModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Prophet
    }

    fn project(&self, horizon: Horizon, last_known_date: NaiveDate) -> Result<ForecastTable> {
        let steps = horizon.days();
        let rows = self
            .trailing_rows(steps, last_known_date)
            .map_err(|source| ForecastError::ForecastGeneration {
                model: ModelKind::Prophet,
                horizon: steps,
                source,
            })?;

        debug!(
            history = self.history_dates.len(),
            steps, "Prophet forecast computed"
        );

        Ok(ForecastTable::new(rows))
    }
}
