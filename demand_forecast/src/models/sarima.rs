//! Seasonal ARIMA handle for step-count forecasting
//!
//! The fitted state is the `(p,d,q)(P,D,Q,s)` order with its coefficients,
//! the innovation variance, and the tail of the fitted series and residuals.
//! Forecasting expands the seasonal and differencing operators into one
//! autoregressive polynomial over the raw series and runs the recursion with
//! future shocks set to zero. Interval widths come from the psi weights of the
//! expanded model.

use crate::error::{ForecastError, ModelFailure, Result};
use crate::models::{ForecastTable, Horizon, HorizonProjector, ModelKind};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Non-seasonal order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

/// Seasonal order `(P, D, Q, s)`; the default is no seasonal component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    /// Season length in steps (7 for a weekly cycle on daily data)
    pub period: usize,
}

fn default_alpha() -> f64 {
    0.05
}

/// Fitted seasonal ARIMA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaModel {
    /// Non-seasonal order
    pub order: ArimaOrder,
    /// Seasonal order
    #[serde(default)]
    pub seasonal_order: SeasonalOrder,
    /// Constant term of the differenced equation
    #[serde(default)]
    pub intercept: f64,
    /// AR coefficients `phi_1..phi_p`
    #[serde(default)]
    pub ar: Vec<f64>,
    /// MA coefficients `theta_1..theta_q`
    #[serde(default)]
    pub ma: Vec<f64>,
    /// Seasonal AR coefficients `Phi_1..Phi_P`
    #[serde(default)]
    pub seasonal_ar: Vec<f64>,
    /// Seasonal MA coefficients `Theta_1..Theta_Q`
    #[serde(default)]
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance
    pub sigma2: f64,
    /// Significance level the model was fit with (0.05 gives 95% intervals)
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Most recent observations, oldest first
    pub endog: Vec<f64>,
    /// One-step residuals aligned with the end of `endog`
    #[serde(default)]
    pub residuals: Vec<f64>,
}

/// Output of [`SarimaModel::get_forecast`]
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaForecast {
    /// Central estimate per step
    pub predicted_mean: Vec<f64>,
    /// `(lower, upper)` interval per step
    pub conf_int: Vec<(f64, f64)>,
}

impl SarimaModel {
    /// Fitted `(p,d,q)(P,D,Q,s)` label, e.g. `SARIMA(1,1,1)(1,0,1,7)`
    pub fn name(&self) -> String {
        let o = &self.order;
        let s = &self.seasonal_order;
        format!(
            "SARIMA({},{},{})({},{},{},{})",
            o.p, o.d, o.q, s.p, s.d, s.q, s.period
        )
    }

    /// Forecast exactly `steps` periods past the end of the fitted series
    pub fn get_forecast(&self, steps: usize) -> std::result::Result<SarimaForecast, ModelFailure> {
        self.check_state()?;

        let ar_poly = self.expanded_ar();
        let ma_poly = self.expanded_ma();

        let ar_lags = ar_poly.len() - 1;
        let ma_lags = ma_poly.len() - 1;
        if self.endog.len() < ar_lags {
            return Err(ModelFailure::ShortHistory {
                required: ar_lags,
                available: self.endog.len(),
            });
        }
        if self.residuals.len() < ma_lags {
            return Err(ModelFailure::ShortHistory {
                required: ma_lags,
                available: self.residuals.len(),
            });
        }

        let mut history = self.endog.clone();
        let mut shocks = self.residuals.clone();
        let mut predicted_mean = Vec::with_capacity(steps);

        for step in 0..steps {
            let mut value = self.intercept;
            for (i, coef) in ar_poly.iter().enumerate().skip(1) {
                value -= coef * history[history.len() - i];
            }
            for (j, coef) in ma_poly.iter().enumerate().skip(1) {
                value += coef * shocks[shocks.len() - j];
            }

            if !value.is_finite() {
                return Err(ModelFailure::NonFinite { step });
            }

            history.push(value);
            shocks.push(0.0);
            predicted_mean.push(value);
        }

        let z = normal_quantile(1.0 - self.alpha / 2.0)?;
        let psi = psi_weights(&ar_poly, &ma_poly, steps);

        let mut cumulative = 0.0;
        let mut conf_int = Vec::with_capacity(steps);
        for (step, (mean, weight)) in predicted_mean.iter().zip(psi.iter()).enumerate() {
            cumulative += weight * weight;
            let half_width = z * (self.sigma2 * cumulative).sqrt();
            if !half_width.is_finite() {
                return Err(ModelFailure::NonFinite { step });
            }
            conf_int.push((mean - half_width, mean + half_width));
        }

        Ok(SarimaForecast {
            predicted_mean,
            conf_int,
        })
    }

    fn check_state(&self) -> std::result::Result<(), ModelFailure> {
        let o = &self.order;
        let s = &self.seasonal_order;

        if self.ar.len() != o.p || self.ma.len() != o.q {
            return Err(ModelFailure::DegenerateFit(format!(
                "order ({},{},{}) does not match {} AR and {} MA coefficients",
                o.p,
                o.d,
                o.q,
                self.ar.len(),
                self.ma.len()
            )));
        }
        if self.seasonal_ar.len() != s.p || self.seasonal_ma.len() != s.q {
            return Err(ModelFailure::DegenerateFit(format!(
                "seasonal order ({},{},{},{}) does not match {} seasonal AR and {} seasonal MA coefficients",
                s.p,
                s.d,
                s.q,
                s.period,
                self.seasonal_ar.len(),
                self.seasonal_ma.len()
            )));
        }
        if (s.p > 0 || s.d > 0 || s.q > 0) && s.period < 2 {
            return Err(ModelFailure::DegenerateFit(format!(
                "seasonal period {} must be at least 2",
                s.period
            )));
        }
        if !self.sigma2.is_finite() || self.sigma2 < 0.0 {
            return Err(ModelFailure::DegenerateFit(format!(
                "innovation variance {} is not a finite non-negative number",
                self.sigma2
            )));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ModelFailure::DegenerateFit(format!(
                "alpha {} must lie strictly between 0 and 1",
                self.alpha
            )));
        }
        if self.endog.is_empty() {
            return Err(ModelFailure::ShortHistory {
                required: 1,
                available: 0,
            });
        }

        Ok(())
    }

    /// `phi(B) Phi(B^s) (1-B)^d (1-B^s)^D` as coefficients of `B^0..B^n`
    fn expanded_ar(&self) -> Vec<f64> {
        let s = &self.seasonal_order;
        let mut poly = lag_polynomial(&self.ar, 1, -1.0);
        poly = multiply(&poly, &lag_polynomial(&self.seasonal_ar, s.period, -1.0));
        for _ in 0..self.order.d {
            poly = multiply(&poly, &[1.0, -1.0]);
        }
        for _ in 0..s.d {
            poly = multiply(&poly, &lag_polynomial(&[1.0], s.period, -1.0));
        }
        poly
    }

    /// `theta(B) Theta(B^s)` as coefficients of `B^0..B^n`
    fn expanded_ma(&self) -> Vec<f64> {
        let s = &self.seasonal_order;
        multiply(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, s.period, 1.0),
        )
    }
}

impl HorizonProjector for SarimaModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Sarima
    }

    fn project(&self, horizon: Horizon, last_known_date: NaiveDate) -> Result<ForecastTable> {
        let steps = horizon.days();
        let forecast =
            self.get_forecast(steps)
                .map_err(|source| ForecastError::ForecastGeneration {
                    model: ModelKind::Sarima,
                    horizon: steps,
                    source,
                })?;

        debug!(model = %self.name(), steps, "SARIMA forecast computed");

        let start = last_known_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "last_known_date={} has no following day",
                    last_known_date
                ))
            })?;

        ForecastTable::from_daily(start, &forecast.predicted_mean, &forecast.conf_int)
    }
}

/// `1 + sign * (c_1 B^lag + c_2 B^(2 lag) + ...)`
fn lag_polynomial(coefficients: &[f64], lag: usize, sign: f64) -> Vec<f64> {
    if coefficients.is_empty() || lag == 0 {
        return vec![1.0];
    }

    let mut poly = vec![0.0; coefficients.len() * lag + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * lag] = sign * c;
    }
    poly
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// MA(infinity) weights `psi_0..psi_{n-1}` of `ma_poly / ar_poly`
fn psi_weights(ar_poly: &[f64], ma_poly: &[f64], n: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        let mut value = ma_poly.get(j).copied().unwrap_or(0.0);
        for i in 1..ar_poly.len().min(j + 1) {
            value -= ar_poly[i] * psi[j - i];
        }
        psi.push(value);
    }
    psi
}

pub(crate) fn normal_quantile(p: f64) -> std::result::Result<f64, ModelFailure> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ModelFailure::DegenerateFit(format!("standard normal: {}", e)))?;
    Ok(normal.inverse_cdf(p))
}
