#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use demand_forecast::models::prophet::{Changepoint, ProphetModel, Seasonality};
use demand_forecast::models::sarima::{ArimaOrder, SarimaModel, SeasonalOrder};
use std::io::Write;
use tempfile::NamedTempFile;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// SARIMA(1,1,1)(1,0,1,7) fitted on daily sales
pub fn sarima_fixture() -> SarimaModel {
    SarimaModel {
        order: ArimaOrder { p: 1, d: 1, q: 1 },
        seasonal_order: SeasonalOrder {
            p: 1,
            d: 0,
            q: 1,
            period: 7,
        },
        intercept: 0.0,
        ar: vec![0.3],
        ma: vec![-0.4],
        seasonal_ar: vec![0.5],
        seasonal_ma: vec![-0.3],
        sigma2: 250_000.0,
        alpha: 0.05,
        endog: vec![
            5263.0, 6064.0, 8314.0, 13995.0, 4822.0, 5651.0, 0.0, 5042.0, 5881.0, 7926.0,
            12402.0, 4998.0, 5436.0, 0.0,
        ],
        residuals: vec![
            120.0, -340.0, 210.0, 55.0, -80.0, 15.0, -400.0, 90.0, 60.0, -30.0, 250.0, -120.0,
            40.0, -10.0,
        ],
    }
}

/// Trend/seasonality model whose history ends on `last`
pub fn prophet_fixture(last: NaiveDate) -> ProphetModel {
    let days = 212u64;
    let first = last.checked_sub_days(Days::new(days - 1)).unwrap();
    ProphetModel {
        history_dates: first.iter_days().take(days as usize).collect(),
        start: first,
        t_scale: (days - 1) as f64,
        y_scale: 41551.0,
        k: 0.02,
        m: 0.14,
        changepoints: vec![
            Changepoint { t: 0.3, delta: 0.01 },
            Changepoint { t: 0.7, delta: -0.015 },
        ],
        seasonalities: vec![
            Seasonality {
                name: "weekly".to_string(),
                period: 7.0,
                fourier_order: 3,
                beta: vec![0.012, -0.031, 0.004, 0.009, -0.002, 0.001],
            },
            Seasonality {
                name: "yearly".to_string(),
                period: 365.25,
                fourier_order: 2,
                beta: vec![0.006, 0.011, -0.003, 0.002],
            },
        ],
        sigma_obs: 0.02,
        trend_sigma: 0.01,
        interval_width: 0.8,
    }
}

/// Sales CSV with the dataset's column layout
pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}
