use chrono::{Days, NaiveDate};
use demand_forecast::models::prophet::{ProphetModel, Seasonality};
use demand_forecast::models::sarima::{ArimaOrder, SarimaModel, SeasonalOrder};
use demand_forecast::{
    apply_holiday_uplift, cluster_stores, generate_forecast, ForecastModel, Horizon, ModelKind,
    SalesDataset, SalesRecord,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: Basic Forecasting Example");
    println!("==========================================\n");

    let last_known = NaiveDate::from_ymd_opt(2015, 7, 31).ok_or("invalid date")?;
    let horizon = Horizon::new(14)?;

    // Fitted handles, normally loaded from the model directory
    let models: [(ModelKind, ForecastModel); 2] = [
        (ModelKind::Sarima, sample_sarima().into()),
        (ModelKind::Prophet, sample_prophet(last_known)?.into()),
    ];

    for (kind, model) in &models {
        let forecast = generate_forecast(*kind, model, last_known, horizon)?;
        println!("{} forecast ({} days):", kind, horizon);
        for row in forecast.rows() {
            println!(
                "  {}: {:>8.1}  ({:.1}, {:.1})",
                row.date, row.predicted, row.lower_bound, row.upper_bound
            );
        }

        // Same forecast under a 15% holiday spike
        let holiday = apply_holiday_uplift(&forecast, 15.0)?;
        let base_total: f64 = forecast.predicted().iter().sum();
        let holiday_total: f64 = holiday.predicted().iter().sum();
        println!(
            "  Total: {:.0} base, {:.0} with holiday uplift\n",
            base_total, holiday_total
        );
    }

    // Segment a handful of synthetic stores
    let dataset = sample_dataset(last_known)?;
    let segmentation = cluster_stores(&dataset, 3)?;
    println!("Store segments:");
    for label in 0..segmentation.k() {
        println!("  Cluster {}: {:?}", label, segmentation.members(label));
    }

    Ok(())
}

/// SARIMA(1,1,0)(1,0,0,7) with two weeks of fitted history
fn sample_sarima() -> SarimaModel {
    let week = [5200.0, 5600.0, 6100.0, 7400.0, 4900.0, 5100.0, 0.0];
    SarimaModel {
        order: ArimaOrder { p: 1, d: 1, q: 0 },
        seasonal_order: SeasonalOrder {
            p: 1,
            d: 0,
            q: 0,
            period: 7,
        },
        intercept: 0.0,
        ar: vec![0.2],
        ma: Vec::new(),
        seasonal_ar: vec![0.6],
        seasonal_ma: Vec::new(),
        sigma2: 90_000.0,
        alpha: 0.05,
        endog: week.iter().chain(week.iter()).copied().collect(),
        residuals: Vec::new(),
    }
}

/// Flat trend with a weekly cycle, fitted on the 90 days up to `last`
fn sample_prophet(last: NaiveDate) -> Result<ProphetModel, Box<dyn std::error::Error>> {
    let first = last
        .checked_sub_days(Days::new(89))
        .ok_or("date out of range")?;
    Ok(ProphetModel {
        history_dates: first.iter_days().take(90).collect(),
        start: first,
        t_scale: 89.0,
        y_scale: 10_000.0,
        k: 0.01,
        m: 0.55,
        changepoints: Vec::new(),
        seasonalities: vec![Seasonality {
            name: "weekly".to_string(),
            period: 7.0,
            fourier_order: 2,
            beta: vec![0.05, -0.08, 0.02, 0.01],
        }],
        sigma_obs: 0.03,
        trend_sigma: 0.02,
        interval_width: 0.8,
    })
}

/// Four weeks of sales for six stores of three sizes
fn sample_dataset(last: NaiveDate) -> Result<SalesDataset, Box<dyn std::error::Error>> {
    let first = last
        .checked_sub_days(Days::new(27))
        .ok_or("date out of range")?;
    let mut records = Vec::new();
    for store_id in 1..=6u32 {
        let base = 2000.0 * f64::from((store_id + 1) / 2);
        for (i, date) in first.iter_days().take(28).enumerate() {
            records.push(SalesRecord {
                store_id,
                date,
                sales: base + (i % 7) as f64 * 50.0,
                promo: store_id % 2 == 0 && i % 3 == 0,
            });
        }
    }
    Ok(SalesDataset::new(records)?)
}
